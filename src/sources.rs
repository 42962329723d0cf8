use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use lopdf::Document;

use crate::error::FilingError;
use crate::model::SheetRegion;

/// Extracted plain text of one page of a source document, 1-indexed.
pub trait TextSource {
    fn page_count(&self) -> usize;

    fn page_text(&mut self, page: usize) -> Result<String, FilingError>;
}

/// (label, value) rows of a sheet region, plus single-cell text access for
/// the entity profile sheet. Missing or non-numeric values surface as None;
/// LineItem collection drops them.
pub trait TabularSource {
    fn labelled_values(
        &mut self,
        region: &SheetRegion,
    ) -> Result<Vec<(String, Option<f64>)>, FilingError>;

    fn cell_text(
        &mut self,
        sheet: &str,
        row: u32,
        column: u32,
    ) -> Result<Option<String>, FilingError>;
}

/// Embedded text layer of a filing PDF.
pub struct PdfTextSource {
    path: PathBuf,
    document: Document,
    page_count: usize,
}

impl PdfTextSource {
    pub fn open(path: &Path) -> Result<Self, FilingError> {
        let document =
            Document::load(path).map_err(|err| FilingError::document_read(path, err))?;
        let page_count = document.get_pages().len();

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_count,
        })
    }
}

impl TextSource for PdfTextSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&mut self, page: usize) -> Result<String, FilingError> {
        if page == 0 || page > self.page_count {
            return Err(FilingError::document_read(
                &self.path,
                format!(
                    "page {page} out of range, document has {} pages",
                    self.page_count
                ),
            ));
        }

        self.document
            .extract_text(&[page as u32])
            .map_err(|err| FilingError::document_read(&self.path, format!("page {page}: {err}")))
    }
}

/// IDX FinancialStatement workbook (.xlsx or .xls).
pub struct WorkbookSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSource {
    pub fn open(path: &Path) -> Result<Self, FilingError> {
        let workbook =
            open_workbook_auto(path).map_err(|err| FilingError::document_read(path, err))?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// (rows, columns) of a sheet's used range.
    pub fn sheet_dimensions(&mut self, sheet: &str) -> Result<(usize, usize), FilingError> {
        Ok(self.range(sheet)?.get_size())
    }

    fn range(&mut self, sheet: &str) -> Result<Range<Data>, FilingError> {
        self.workbook
            .worksheet_range(sheet)
            .map_err(|err| FilingError::document_read(&self.path, format!("sheet {sheet}: {err}")))
    }
}

impl TabularSource for WorkbookSource {
    fn labelled_values(
        &mut self,
        region: &SheetRegion,
    ) -> Result<Vec<(String, Option<f64>)>, FilingError> {
        let range = self.range(region.sheet)?;
        let Some((end_row, _)) = range.end() else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for row in region.first_row..=end_row {
            let label = match range.get_value((row, region.label_column)) {
                Some(Data::String(text)) => text.trim().to_string(),
                _ => String::new(),
            };
            let value = range
                .get_value((row, region.value_column))
                .and_then(numeric_cell);

            rows.push((label, value));
        }

        Ok(rows)
    }

    fn cell_text(
        &mut self,
        sheet: &str,
        row: u32,
        column: u32,
    ) -> Result<Option<String>, FilingError> {
        let range = self.range(sheet)?;

        let text = match range.get_value((row, column)) {
            Some(Data::String(text)) => Some(text.trim().to_string()),
            Some(Data::Int(value)) => Some(value.to_string()),
            Some(Data::Float(value)) => Some(value.to_string()),
            _ => None,
        };

        Ok(text)
    }
}

fn numeric_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(value) => Some(*value as f64),
        Data::Float(value) => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cell_accepts_only_numbers() {
        assert_eq!(numeric_cell(&Data::Int(1000)), Some(1000.0));
        assert_eq!(numeric_cell(&Data::Float(2.5)), Some(2.5));
        assert_eq!(numeric_cell(&Data::String("n/a".to_string())), None);
        assert_eq!(numeric_cell(&Data::Bool(true)), None);
        assert_eq!(numeric_cell(&Data::Empty), None);
    }
}
