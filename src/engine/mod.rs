// Engine: navigation state, local presence, transfers and file actions.

pub mod actions;
pub mod browser;
pub mod navigator;
pub mod presence;
pub mod stats;
pub mod transfer;
