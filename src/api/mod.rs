// Bridge surface called from the Flutter UI.

pub mod browser_api;
pub mod simple;
