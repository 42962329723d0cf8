use serde::Serialize;

/// One labeled numeric row read from a statement sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub label: String,
    pub value: f64,
}

impl LineItem {
    /// Keeps only usable rows: non-empty label, numeric value. Statement
    /// sheets pad their used range with headers, blanks, and subtotal
    /// separators, so everything else is dropped without comment.
    pub fn collect(rows: Vec<(String, Option<f64>)>) -> Vec<Self> {
        rows.into_iter()
            .filter_map(|(label, value)| {
                let value = value?;
                let label = label.trim();
                if label.is_empty() {
                    return None;
                }

                Some(Self {
                    label: label.to_string(),
                    value,
                })
            })
            .collect()
    }
}

/// Fixed contextual fields of one pipeline run.
#[derive(Debug, Clone)]
pub struct FilingContext {
    pub entity_name: String,
    pub entity_code: String,
    pub quarter: String,
}

/// The unit persisted by the statement pipeline: one line item joined with
/// its matched note codes and the run context.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub entity_code: String,
    pub entity_name: String,
    pub quarter: String,
    pub category: String,
    pub item: String,
    pub value: f64,
    pub notes: String,
}

/// One titled section of the notes-to-financial-statements prose.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSection {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
}

/// Cell window a statement sheet is read through: labels in one column,
/// values in the neighbouring one, starting below the header block.
#[derive(Debug, Clone, Copy)]
pub struct SheetRegion {
    pub sheet: &'static str,
    pub first_row: u32,
    pub label_column: u32,
    pub value_column: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCounts {
    pub category: String,
    pub rows_read: usize,
    pub items_kept: usize,
    pub matched_exact: usize,
    pub matched_fuzzy: usize,
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub report_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub workbook: String,
    pub workbook_sha256: String,
    pub pdf: String,
    pub pdf_sha256: String,
    pub entity_code: String,
    pub entity_name: String,
    pub quarter: String,
    pub note_pages: String,
    pub note_labels: usize,
    pub threshold: f64,
    pub categories: Vec<CategoryCounts>,
    pub records_inserted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalkReport {
    pub report_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub pdf: String,
    pub pdf_sha256: String,
    pub entity_code: Option<String>,
    pub page_selection: String,
    pub pages_used: usize,
    pub sections_inserted: usize,
    pub sections_dropped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetEntry {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkbookManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub workbook: String,
    pub sha256: String,
    pub sheet_count: usize,
    pub sheets: Vec<SheetEntry>,
}
