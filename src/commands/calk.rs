use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::cli::CalkArgs;
use crate::config::CalkConfig;
use crate::model::CalkReport;
use crate::pipeline;
use crate::sink::SqliteSink;
use crate::sources::PdfTextSource;
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

pub fn run(args: CalkArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("calk-{}", utc_compact_string(started_ts));

    let config = CalkConfig::from_args(args)?;
    ensure_directory(&config.data_root)?;
    if let Some(parent) = config
        .db_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        ensure_directory(parent)?;
    }

    info!(
        pdf = %config.pdf.display(),
        selection = %config.pages,
        db = %config.db_path.display(),
        run_id = %run_id,
        "starting notes extraction"
    );

    let pdf_sha256 = sha256_file(&config.pdf)?;
    let mut pdf = PdfTextSource::open(&config.pdf)?;
    let mut sink = SqliteSink::open(&config.db_path)?;

    let outcome = pipeline::run_calk(&config, &mut pdf, &mut sink)?;

    let report = CalkReport {
        report_version: 1,
        run_id,
        started_at,
        finished_at: now_utc_string(),
        pdf: config.pdf.display().to_string(),
        pdf_sha256,
        entity_code: config.entity_code.clone(),
        page_selection: config.pages.to_string(),
        pages_used: outcome.pages_used,
        sections_inserted: outcome.sections_inserted,
        sections_dropped: outcome.sections_dropped,
    };

    let report_path = config.report_path.clone().unwrap_or_else(|| {
        config
            .data_root
            .join("reports")
            .join(format!("calk_run_{}.json", utc_compact_string(started_ts)))
    });
    write_json_pretty(&report_path, &report)?;

    info!(path = %report_path.display(), "wrote notes run report");
    info!(
        sections = report.sections_inserted,
        dropped = report.sections_dropped,
        "notes extraction completed"
    );

    Ok(())
}
