// Remote listing: entry model, source abstraction and the GitHub contents client.

pub mod github;
pub mod model;
pub mod traits;
