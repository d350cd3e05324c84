// Content type detection for opening and sharing cached files.

pub mod mime;
