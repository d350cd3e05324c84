use serde::{Deserialize, Serialize};

/// Kind of a listing entry as reported by the contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything newer. Never descended into.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLinks {
    #[serde(rename = "self", default)]
    pub self_url: String,
    #[serde(default)]
    pub git: String,
    #[serde(default)]
    pub html: String,
}

/// One file or subdirectory record from a directory listing.
///
/// Identity is `path`. Entries are immutable once fetched; a new fetch
/// replaces the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    /// Size in bytes, 0 for directories.
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "url", default)]
    pub api_url: String,
    #[serde(rename = "html_url", default)]
    pub web_url: String,
    #[serde(default)]
    pub git_url: String,
    /// Direct download URL. `None` for directories.
    #[serde(rename = "download_url", default)]
    pub raw_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "_links", default)]
    pub links: EntryLinks,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Case-insensitive substring filter on entry names, preserving order.
/// An empty query keeps everything.
pub fn filter_entries<'a>(entries: &'a [DirectoryEntry], query: &str) -> Vec<&'a DirectoryEntry> {
    if query.is_empty() {
        return entries.iter().collect();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .collect()
}
