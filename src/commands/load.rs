use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::cli::LoadArgs;
use crate::config::LoadConfig;
use crate::model::LoadReport;
use crate::pipeline;
use crate::sink::SqliteSink;
use crate::sources::{PdfTextSource, WorkbookSource};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

pub fn run(args: LoadArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("load-{}", utc_compact_string(started_ts));

    let config = LoadConfig::from_args(args)?;
    ensure_directory(&config.data_root)?;
    if let Some(parent) = config
        .db_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        ensure_directory(parent)?;
    }

    info!(
        workbook = %config.workbook.display(),
        pdf = %config.pdf.display(),
        db = %config.db_path.display(),
        run_id = %run_id,
        "starting statement load"
    );

    let workbook_sha256 = sha256_file(&config.workbook)?;
    let pdf_sha256 = sha256_file(&config.pdf)?;

    let mut pdf = PdfTextSource::open(&config.pdf)?;
    let mut workbook = WorkbookSource::open(&config.workbook)?;
    let mut sink = SqliteSink::open(&config.db_path)?;

    let outcome = pipeline::run_load(&config, &mut pdf, &mut workbook, &mut sink)?;

    let unmatched_total: usize = outcome
        .categories
        .iter()
        .map(|counts| counts.unmatched.len())
        .sum();
    let report = LoadReport {
        report_version: 1,
        run_id,
        started_at,
        finished_at: now_utc_string(),
        workbook: config.workbook.display().to_string(),
        workbook_sha256,
        pdf: config.pdf.display().to_string(),
        pdf_sha256,
        entity_code: outcome.context.entity_code,
        entity_name: outcome.context.entity_name,
        quarter: outcome.context.quarter,
        note_pages: config.note_pages.to_string(),
        note_labels: outcome.note_labels,
        threshold: config.threshold,
        categories: outcome.categories,
        records_inserted: outcome.records_inserted,
    };

    let report_path = config.report_path.clone().unwrap_or_else(|| {
        config
            .data_root
            .join("reports")
            .join(format!("load_run_{}.json", utc_compact_string(started_ts)))
    });
    write_json_pretty(&report_path, &report)?;

    info!(path = %report_path.display(), "wrote load run report");
    info!(
        records = report.records_inserted,
        unmatched = unmatched_total,
        "load completed"
    );

    Ok(())
}
