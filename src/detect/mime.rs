use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::FALLBACK_MIME;

/// MIME type from the file extension, if the extension is known.
pub fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    mime_guess::from_path(file_name).first_raw()
}

/// Detect a MIME type from the first bytes of a file.
pub fn sniff_mime(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    // ZIP local file header; docx/xlsx/pptx are ZIP containers too.
    if header.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        return Some("application/zip");
    }
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    // OLE2 compound document: legacy doc/xls/ppt.
    if header.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return Some("application/msword");
    }
    None
}

/// MIME type by name only, falling back to PDF.
pub fn mime_for(file_name: &str) -> &'static str {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
}

/// MIME type of a local file: extension first, then magic bytes, then PDF.
pub fn mime_for_file(path: &Path) -> &'static str {
    if let Some(mime) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(mime_from_extension)
    {
        return mime;
    }

    let mut header = [0u8; 8];
    let sniffed = File::open(path)
        .and_then(|mut f| f.read(&mut header))
        .ok()
        .and_then(|n| sniff_mime(&header[..n]));
    sniffed.unwrap_or(FALLBACK_MIME)
}
