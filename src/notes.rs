use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::error::FilingError;
use crate::normalize::normalize_label;
use crate::sources::TextSource;
use crate::util::PageRange;

/// One label's footnote references as found in the notes pages.
#[derive(Debug, Clone)]
pub struct NoteEntry {
    /// Prose form of the label as first seen, kept for diagnostics.
    pub label: String,
    pub codes: BTreeSet<String>,
}

/// Mapping from normalized label to its unioned footnote codes. Rebuilt
/// from scratch on every run.
#[derive(Debug, Default)]
pub struct NoteCatalog {
    entries: BTreeMap<String, NoteEntry>,
}

impl NoteCatalog {
    /// Unions `codes` into the entry for `label`, keyed by the normalized
    /// form. Entries are only ever created with at least one code.
    pub fn insert(&mut self, label: &str, codes: impl IntoIterator<Item = String>) {
        let key = normalize_label(label);
        if key.is_empty() {
            return;
        }

        let codes: Vec<String> = codes
            .into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        if codes.is_empty() {
            return;
        }

        let entry = self.entries.entry(key).or_insert_with(|| NoteEntry {
            label: label.trim().to_string(),
            codes: BTreeSet::new(),
        });
        entry.codes.extend(codes);
    }

    pub fn get(&self, normalized: &str) -> Option<&NoteEntry> {
        self.entries.get(normalized)
    }

    /// Entries in normalized-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &NoteEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scans notes-page text for line-item labels and their footnote codes.
///
/// Two shapes are recognized: a label immediately followed by codes
/// ("Kas dan setara kas 2a, 2c") and a marker keyword followed by a code
/// and then the label ("Catatan 2a Kas dan setara kas").
pub struct NoteExtractor {
    label_codes: Regex,
    keyword_codes: Regex,
    keyword: String,
}

impl NoteExtractor {
    pub fn new(keyword: &str) -> Result<Self> {
        let label_codes =
            Regex::new(r"([A-Za-z][A-Za-z ]*)\s+(\d+[a-z]{0,2}(?:\s*,\s*\d+[a-z]{0,2})*)\b")
                .context("failed to compile label/code pattern")?;
        let keyword_codes = Regex::new(&format!(
            r"(?i:{})[ \t]*(\d+[a-z]{{0,2}})[ \t]+([^\r\n]+)",
            regex::escape(keyword)
        ))
        .context("failed to compile note keyword pattern")?;

        Ok(Self {
            label_codes,
            keyword_codes,
            keyword: keyword.trim().to_string(),
        })
    }

    /// Builds the catalog from every page in the range. Any unreadable
    /// page aborts the run with no partial result handed out.
    pub fn collect<S: TextSource>(
        &self,
        source: &mut S,
        pages: &PageRange,
    ) -> Result<NoteCatalog, FilingError> {
        let mut catalog = NoteCatalog::default();

        for page in pages.iter() {
            let text = source.page_text(page)?;
            self.scan_page(&text, &mut catalog);
            debug!(page, labels = catalog.len(), "scanned notes page");
        }

        Ok(catalog)
    }

    pub fn scan_page(&self, text: &str, catalog: &mut NoteCatalog) {
        for captures in self.label_codes.captures_iter(text) {
            let raw_label = &captures[1];
            // A label ending in the marker keyword is the marker construct,
            // not part of the item name.
            let label = self.strip_trailing_keyword(raw_label).unwrap_or(raw_label);
            let codes = captures[2].split(',').map(str::to_string);
            catalog.insert(label, codes);
        }

        for captures in self.keyword_codes.captures_iter(text) {
            let code = captures[1].to_string();
            catalog.insert(&captures[2], [code]);
        }
    }

    fn strip_trailing_keyword<'a>(&self, label: &'a str) -> Option<&'a str> {
        let label = label.trim_end();
        let split = label.len().checked_sub(self.keyword.len())?;
        if !label.is_char_boundary(split) {
            return None;
        }

        let (head, tail) = label.split_at(split);
        if !tail.eq_ignore_ascii_case(&self.keyword) {
            return None;
        }
        if !(head.is_empty() || head.ends_with(' ')) {
            return None;
        }

        Some(head.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> NoteExtractor {
        NoteExtractor::new("Catatan").unwrap()
    }

    fn codes(catalog: &NoteCatalog, key: &str) -> Vec<String> {
        catalog
            .get(key)
            .map(|entry| entry.codes.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn label_then_codes_builds_catalog_entries() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Kas dan setara kas 2a, 2c 448.576", &mut catalog);

        assert_eq!(codes(&catalog, "kas dan setara kas"), vec!["2a", "2c"]);
    }

    #[test]
    fn codes_union_across_pages() {
        let mut catalog = NoteCatalog::default();
        let extractor = extractor();
        extractor.scan_page("Kas 2a, 2c", &mut catalog);
        extractor.scan_page("Kas 2a", &mut catalog);

        assert_eq!(catalog.len(), 1);
        assert_eq!(codes(&catalog, "kas"), vec!["2a", "2c"]);
    }

    #[test]
    fn keyword_marker_parses_code_then_label() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Catatan 2a Kas dan setara kas", &mut catalog);

        assert_eq!(codes(&catalog, "kas dan setara kas"), vec!["2a"]);
        assert!(catalog.get("catatan").is_none());
    }

    #[test]
    fn trailing_keyword_is_stripped_from_labels() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Piutang usaha Catatan 2c", &mut catalog);

        assert_eq!(codes(&catalog, "piutang usaha"), vec!["2c"]);
    }

    #[test]
    fn label_and_codes_may_be_split_across_lines() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Kas\n2a", &mut catalog);

        assert_eq!(codes(&catalog, "kas"), vec!["2a"]);
    }

    #[test]
    fn labels_without_codes_are_absent() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Jumlah aset lancar", &mut catalog);

        assert!(catalog.is_empty());
    }

    #[test]
    fn codes_are_trimmed_before_storage() {
        let mut catalog = NoteCatalog::default();
        extractor().scan_page("Kas 2a , 2c", &mut catalog);

        assert_eq!(codes(&catalog, "kas"), vec!["2a", "2c"]);
    }

    #[test]
    fn insert_skips_empty_code_sets() {
        let mut catalog = NoteCatalog::default();
        catalog.insert("Kas", Vec::new());
        catalog.insert("Kas", vec!["  ".to_string()]);

        assert!(catalog.is_empty());
    }
}
