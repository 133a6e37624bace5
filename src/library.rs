//! Manga / chapter data as handed to the reader by the server layer.
//!
//! The reader does not fetch anything itself; a library file (TOML) stands in
//! for the already-resolved query results.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manga {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chapter {
    pub id: i64,
    /// Ordering key assigned by the source; unique within a manga.
    pub source_order: i64,
    pub name: String,
    pub page_count: usize,
    /// 0-based index of the last page read.
    #[serde(default)]
    pub last_page_read: usize,
    #[serde(default)]
    pub is_read: bool,
}

/// Contents of a library file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Library {
    /// Manga being read (for `view`).
    pub manga: Option<Manga>,
    pub chapters: Vec<Chapter>,
    /// Whole library (for duplicate detection).
    pub mangas: Vec<Manga>,
}

impl Library {
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut lib: Library = toml::from_str(text)?;
        lib.chapters.sort_by_key(|c| c.source_order);
        for ch in &mut lib.chapters {
            if ch.page_count > 0 {
                ch.last_page_read = ch.last_page_read.min(ch.page_count - 1);
            } else {
                ch.last_page_read = 0;
            }
        }
        debug!(
            "library: {} chapters, {} mangas",
            lib.chapters.len(),
            lib.mangas.len()
        );
        Ok(lib)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let lib = Self::from_toml(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!("library: loaded {}", path.display());
        Ok(lib)
    }

    /// Index of the chapter to open first: the first unread one, else the last.
    pub fn resume_index(&self) -> usize {
        self.chapters
            .iter()
            .position(|c| !c.is_read)
            .unwrap_or_else(|| self.chapters.len().saturating_sub(1))
    }
}
