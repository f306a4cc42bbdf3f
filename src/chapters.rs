//! The chapter registry: which wikidocs page each chapter is published on.
//!
//! wikidocs assigns page ids when a page is first created, so the mapping
//! from chapter to page has to be maintained by hand. The registry is used
//! twice: the splitter names and fills one output file per entry, and the
//! cross-reference resolver turns chapter numbers into absolute page links.
//!
//! [`ChapterRegistry::default`] holds the published LKMPG book. A different
//! book (or a re-published one) can supply its own list as JSON:
//!
//! ```json
//! [
//!   { "number": "0", "title": "Title", "page_id": "196791" },
//!   { "number": "1", "title": "Introduction", "page_id": "196792" }
//! ]
//! ```

use crate::error::Tex2MdError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One published chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number as it appears in the numbered headings ("0", "1", …).
    pub number: String,
    /// Human-readable title. Informational only.
    pub title: String,
    /// wikidocs page id the chapter is published under.
    pub page_id: String,
}

impl Chapter {
    pub fn new(
        number: impl Into<String>,
        title: impl Into<String>,
        page_id: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            page_id: page_id.into(),
        }
    }
}

/// Ordered list of chapters. Index `k` corresponds to output file `k`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterRegistry {
    chapters: Vec<Chapter>,
}

const LKMPG_CHAPTERS: &[(&str, &str, &str)] = &[
    ("0", "Title", "196791"),
    ("1", "Introduction", "196792"),
    ("2", "Headers", "196793"),
    ("3", "Examples", "196794"),
    ("4", "Hello World", "196795"),
    ("5", "Preliminaries", "196796"),
    ("6", "Character Device drivers", "196797"),
    ("7", "The /proc File System", "196798"),
    ("8", "sysfs: Interacting with your module", "196799"),
    ("9", "Talking To Device Files", "196800"),
    ("10", "System Calls", "196801"),
    ("11", "Blocking Processes and threads", "196803"),
    ("12", "Avoiding Collisions and Deadlocks", "196804"),
    ("13", "Replacing Print Macros", "196805"),
    ("14", "Scheduling Tasks", "196806"),
    ("15", "Interrupt Handlers", "196807"),
    ("16", "Crypto", "196808"),
    ("17", "Virtual Input Device Driver", "196809"),
    ("18", "Standardizing the interfaces: The Device Model", "196810"),
    ("19", "Optimizations", "196811"),
    ("20", "Common Pitfalls", "196812"),
    ("21", "Where To Go From Here?", "196813"),
];

impl Default for ChapterRegistry {
    fn default() -> Self {
        Self::new(
            LKMPG_CHAPTERS
                .iter()
                .map(|(number, title, page_id)| Chapter::new(*number, *title, *page_id))
                .collect(),
        )
    }
}

impl ChapterRegistry {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    /// Load a registry from a JSON array of chapters.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Tex2MdError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Tex2MdError::RegistryLoadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Tex2MdError::RegistryLoadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Page id for a chapter number, e.g. `"5"` → `"196796"`.
    pub fn page_id(&self, chapter_number: &str) -> Option<&str> {
        self.chapters
            .iter()
            .find(|c| c.number == chapter_number)
            .map(|c| c.page_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Check the registry is non-empty and chapter numbers are unique.
    pub fn validate(&self) -> Result<(), Tex2MdError> {
        if self.chapters.is_empty() {
            return Err(Tex2MdError::InvalidConfig(
                "Chapter registry is empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if !seen.insert(chapter.number.as_str()) {
                return Err(Tex2MdError::InvalidConfig(format!(
                    "Duplicate chapter number '{}' in registry",
                    chapter.number
                )));
            }
        }
        Ok(())
    }
}
