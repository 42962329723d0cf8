use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::cli::ReportKind;
use crate::config::{CalkConfig, LoadConfig, PageSelection};
use crate::matcher::{MatchOutcome, NoteMatcher};
use crate::model::{CategoryCounts, FilingContext, LineItem, MatchedRecord};
use crate::notes::{NoteEntry, NoteExtractor};
use crate::sections::SectionOrganizer;
use crate::sink::RecordSink;
use crate::sources::{TabularSource, TextSource};

/// Company-profile sheet present in every IDX FinancialStatement workbook.
const PROFILE_SHEET: &str = "1000000";
const PROFILE_NAME_CELL: (u32, u32) = (5, 1);
const PROFILE_CODE_CELL: (u32, u32) = (7, 1);

#[derive(Debug)]
pub struct LoadOutcome {
    pub context: FilingContext,
    pub note_labels: usize,
    pub categories: Vec<CategoryCounts>,
    pub records_inserted: usize,
}

/// Runs one statement load: build the note catalog from the PDF, read the
/// requested statement sheets, join items to note codes, and replace the
/// affected rows in the sink.
pub fn run_load<T, W, S>(
    config: &LoadConfig,
    pdf: &mut T,
    workbook: &mut W,
    sink: &mut S,
) -> Result<LoadOutcome>
where
    T: TextSource,
    W: TabularSource,
    S: RecordSink,
{
    let context = resolve_context(config, workbook)?;
    info!(
        entity_code = %context.entity_code,
        entity_name = %context.entity_name,
        quarter = %context.quarter,
        "resolved filing context"
    );

    let extractor = NoteExtractor::new(&config.note_keyword)?;
    let catalog = extractor.collect(pdf, &config.note_pages)?;
    if catalog.is_empty() {
        warn!(
            pages = %config.note_pages,
            "no note labels found; items will load without note codes"
        );
    } else {
        info!(labels = catalog.len(), pages = %config.note_pages, "built note catalog");
    }

    let matcher = NoteMatcher::new(&catalog, config.threshold);
    let mut records = Vec::new();
    let mut categories = Vec::new();
    for kind in &config.reports {
        let rows = workbook.labelled_values(&kind.region())?;
        let rows_read = rows.len();
        let items = LineItem::collect(rows);
        let (mut category_records, counts) =
            assemble_category(&context, *kind, rows_read, items, &matcher);
        info!(
            category = %counts.category,
            rows_read = counts.rows_read,
            items_kept = counts.items_kept,
            matched_exact = counts.matched_exact,
            matched_fuzzy = counts.matched_fuzzy,
            unmatched = counts.unmatched.len(),
            "assembled statement category"
        );
        records.append(&mut category_records);
        categories.push(counts);
    }

    let records_inserted = sink.replace_statement_records(&records)?;

    Ok(LoadOutcome {
        context,
        note_labels: catalog.len(),
        categories,
        records_inserted,
    })
}

fn assemble_category(
    context: &FilingContext,
    kind: ReportKind,
    rows_read: usize,
    items: Vec<LineItem>,
    matcher: &NoteMatcher<'_>,
) -> (Vec<MatchedRecord>, CategoryCounts) {
    let mut counts = CategoryCounts {
        category: kind.category().to_string(),
        rows_read,
        items_kept: items.len(),
        matched_exact: 0,
        matched_fuzzy: 0,
        unmatched: Vec::new(),
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let notes = match matcher.lookup(&item.label) {
            MatchOutcome::Exact(entry) => {
                counts.matched_exact += 1;
                join_codes(entry)
            }
            MatchOutcome::Fuzzy { entry, ratio } => {
                counts.matched_fuzzy += 1;
                debug!(item = %item.label, candidate = %entry.label, ratio, "fuzzy note match");
                join_codes(entry)
            }
            MatchOutcome::Unmatched => {
                warn!(item = %item.label, category = kind.category(), "no note match for item");
                counts.unmatched.push(item.label.clone());
                String::new()
            }
        };

        records.push(MatchedRecord {
            entity_code: context.entity_code.clone(),
            entity_name: context.entity_name.clone(),
            quarter: context.quarter.clone(),
            category: kind.category().to_string(),
            item: item.label,
            value: item.value,
            notes,
        });
    }

    (records, counts)
}

fn join_codes(entry: &NoteEntry) -> String {
    entry
        .codes
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Context fields come from explicit overrides first, then the workbook's
/// profile sheet, and for the quarter the IDX filename convention.
fn resolve_context<W: TabularSource>(
    config: &LoadConfig,
    workbook: &mut W,
) -> Result<FilingContext> {
    let entity_name = match &config.entity_name {
        Some(name) => name.clone(),
        None => workbook
            .cell_text(PROFILE_SHEET, PROFILE_NAME_CELL.0, PROFILE_NAME_CELL.1)?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .with_context(|| {
                format!("entity name not found on sheet {PROFILE_SHEET}; pass --entity-name")
            })?,
    };

    let entity_code = match &config.entity_code {
        Some(code) => code.clone(),
        None => workbook
            .cell_text(PROFILE_SHEET, PROFILE_CODE_CELL.0, PROFILE_CODE_CELL.1)?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .with_context(|| {
                format!("entity code not found on sheet {PROFILE_SHEET}; pass --entity-code")
            })?,
    };

    let quarter = match &config.quarter {
        Some(quarter) => quarter.clone(),
        None => {
            let derived = match config.workbook.file_name().and_then(|name| name.to_str()) {
                Some(name) => quarter_from_filename(name)?,
                None => None,
            };
            derived.with_context(|| {
                format!(
                    "could not derive the quarter from {}; pass --quarter",
                    config.workbook.display()
                )
            })?
        }
    };

    Ok(FilingContext {
        entity_name,
        entity_code,
        quarter,
    })
}

/// IDX workbooks are named FinancialStatement-<year>-<period>-<ticker>;
/// the annual period "Tahunan" maps to quarter IV.
fn quarter_from_filename(filename: &str) -> Result<Option<String>> {
    let pattern = Regex::new(r"FinancialStatement-\d{4}-(Tahunan|III|II|I)-")
        .context("failed to compile quarter pattern")?;
    let Some(captures) = pattern.captures(filename) else {
        return Ok(None);
    };

    let quarter = match &captures[1] {
        "Tahunan" => "IV",
        period => period,
    };
    Ok(Some(quarter.to_string()))
}

#[derive(Debug)]
pub struct CalkOutcome {
    pub pages_used: usize,
    pub sections_inserted: usize,
    pub sections_dropped: usize,
}

/// Extracts the notes chapter and replaces the stored sections for the
/// configured entity.
pub fn run_calk<T, S>(config: &CalkConfig, pdf: &mut T, sink: &mut S) -> Result<CalkOutcome>
where
    T: TextSource,
    S: RecordSink,
{
    let (text, pages_used) = collect_notes_text(config, pdf)?;
    let organizer = SectionOrganizer::new()?;
    let outcome = organizer.organize(&text);
    if outcome.dropped_titles > 0 {
        warn!(
            dropped = outcome.dropped_titles,
            "dropped section titles with no text"
        );
    }
    if outcome.sections.is_empty() {
        warn!("no sections recognized in the selected pages");
    }

    let sections_inserted =
        sink.replace_note_sections(config.entity_code.as_deref(), &outcome.sections)?;
    info!(
        pages = pages_used,
        sections = sections_inserted,
        "stored note sections"
    );

    Ok(CalkOutcome {
        pages_used,
        sections_inserted,
        sections_dropped: outcome.dropped_titles,
    })
}

fn collect_notes_text<T: TextSource>(config: &CalkConfig, pdf: &mut T) -> Result<(String, usize)> {
    match &config.pages {
        PageSelection::Range(range) => {
            let mut chunks = Vec::with_capacity(range.page_count());
            for page in range.iter() {
                chunks.push(pdf.page_text(page)?);
            }
            Ok((chunks.join("\n"), range.page_count()))
        }
        PageSelection::Marker(marker) => {
            let mut chunks = Vec::new();
            for page in 1..=pdf.page_count() {
                let text = pdf.page_text(page)?;
                if text.contains(marker) {
                    debug!(page, "marker page kept");
                    chunks.push(text);
                }
            }
            if chunks.is_empty() {
                bail!("marker {marker:?} matched no pages");
            }
            Ok((chunks.join("\n"), chunks.len()))
        }
    }
}
