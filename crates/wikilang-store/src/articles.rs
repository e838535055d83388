//! Scraped article documents: `<root>/<language>/<slug>.txt`.
//!
//! Articles are the raw material for corpus partitions. A document is keyed by
//! the slug of its title within its language, so scraping a title again
//! overwrites the earlier copy.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use wikilang_core::text;

use crate::fs::check_name;
use crate::StoreError;

/// Directory of cleaned article texts, one subdirectory per language.
pub struct ArticleDir {
    root: PathBuf,
}

impl ArticleDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn language_dir(&self, language: &str) -> Result<PathBuf, StoreError> {
        check_name(language)?;
        Ok(self.root.join(language))
    }

    /// Store an article under the slug of its title.
    ///
    /// Returns `None` (and writes nothing) for titles with no alphanumeric
    /// characters.
    pub fn write(
        &self,
        language: &str,
        title: &str,
        text: &str,
    ) -> Result<Option<PathBuf>, StoreError> {
        let slug = text::slugify(title);
        if slug.is_empty() {
            warn!(language, title, "skipping article with empty slug");
            return Ok(None);
        }
        let dir = self.language_dir(language)?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{slug}.txt"));
        std::fs::write(&path, text)?;
        debug!(language, slug = %slug, bytes = text.len(), "wrote article");
        Ok(Some(path))
    }

    /// Article files for `language`, sorted by file name.
    pub fn paths(&self, language: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.language_dir(language)?;
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "txt") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn article_count(&self, language: &str) -> Result<usize, StoreError> {
        Ok(self.paths(language)?.len())
    }

    /// Whitespace-separated words across all of the language's articles.
    pub fn word_count(&self, language: &str) -> Result<usize, StoreError> {
        let mut total = 0;
        for path in self.paths(language)? {
            total += text::words(&std::fs::read_to_string(path)?).count();
        }
        Ok(total)
    }

    /// All words of the language's articles, in file-name order.
    pub fn words(&self, language: &str) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        for path in self.paths(language)? {
            let body = std::fs::read_to_string(path)?;
            out.extend(text::words(&body).map(str::to_string));
        }
        Ok(out)
    }
}
