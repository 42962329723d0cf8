use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::{CalkArgs, LoadArgs, ReportKind};
use crate::util::{PageRange, parse_page_range};

pub const WORKBOOK_ENV: &str = "FILINGS_WORKBOOK";
pub const PDF_ENV: &str = "FILINGS_PDF";
pub const DB_ENV: &str = "FILINGS_DB";

/// Heading printed on every page of the notes chapter in IDX filings.
pub const DEFAULT_SCAN_MARKER: &str = "CATATAN ATAS LAPORAN KEUANGAN";

/// Fully resolved settings for a statement load. Flags win over
/// environment variables; the database path falls back to a file under
/// the data root.
#[derive(Debug)]
pub struct LoadConfig {
    pub data_root: PathBuf,
    pub workbook: PathBuf,
    pub pdf: PathBuf,
    pub db_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub note_pages: PageRange,
    pub reports: Vec<ReportKind>,
    pub quarter: Option<String>,
    pub entity_name: Option<String>,
    pub entity_code: Option<String>,
    pub threshold: f64,
    pub note_keyword: String,
}

impl LoadConfig {
    pub fn from_args(args: LoadArgs) -> Result<Self> {
        let workbook = resolve_input(args.workbook, WORKBOOK_ENV, "--workbook")?;
        let pdf = resolve_input(args.pdf, PDF_ENV, "--pdf")?;
        let db_path = resolve_db_path(args.db_path, &args.data_root);
        let note_pages = parse_page_range(&args.note_pages)?;

        if !(0.0..=1.0).contains(&args.threshold) {
            bail!(
                "match threshold must be between 0.0 and 1.0, got {}",
                args.threshold
            );
        }
        let note_keyword = args.note_keyword.trim().to_string();
        if note_keyword.is_empty() {
            bail!("note keyword must not be empty");
        }

        let reports = if args.reports.is_empty() {
            ReportKind::all().to_vec()
        } else {
            let mut reports: Vec<ReportKind> = Vec::new();
            for kind in args.reports {
                if !reports.contains(&kind) {
                    reports.push(kind);
                }
            }
            reports
        };

        Ok(Self {
            data_root: args.data_root,
            workbook,
            pdf,
            db_path,
            report_path: args.report_path,
            note_pages,
            reports,
            quarter: args.quarter,
            entity_name: args.entity_name,
            entity_code: args.entity_code,
            threshold: args.threshold,
            note_keyword,
        })
    }
}

/// How the notes chapter is located inside the PDF.
#[derive(Debug)]
pub enum PageSelection {
    Range(PageRange),
    Marker(String),
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::Range(range) => write!(f, "pages {range}"),
            PageSelection::Marker(marker) => write!(f, "marker {marker:?}"),
        }
    }
}

#[derive(Debug)]
pub struct CalkConfig {
    pub data_root: PathBuf,
    pub pdf: PathBuf,
    pub db_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub pages: PageSelection,
    pub entity_code: Option<String>,
}

impl CalkConfig {
    pub fn from_args(args: CalkArgs) -> Result<Self> {
        let pdf = resolve_input(args.pdf, PDF_ENV, "--pdf")?;
        let db_path = resolve_db_path(args.db_path, &args.data_root);

        let pages = match (args.pages, args.scan_marker) {
            (Some(_), Some(_)) => bail!("--pages and --scan-marker are mutually exclusive"),
            (Some(raw), None) => PageSelection::Range(parse_page_range(&raw)?),
            (None, Some(marker)) => {
                let marker = marker.trim().to_string();
                if marker.is_empty() {
                    bail!("scan marker must not be empty");
                }
                PageSelection::Marker(marker)
            }
            (None, None) => PageSelection::Marker(DEFAULT_SCAN_MARKER.to_string()),
        };

        Ok(Self {
            data_root: args.data_root,
            pdf,
            db_path,
            report_path: args.report_path,
            pages,
            entity_code: args.entity_code,
        })
    }
}

pub(crate) fn resolve_input(arg: Option<PathBuf>, env_key: &str, flag: &str) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }
    if let Ok(value) = env::var(env_key) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    bail!("missing input: pass {flag} or set {env_key}")
}

fn resolve_db_path(arg: Option<PathBuf>, data_root: &Path) -> PathBuf {
    if let Some(path) = arg {
        return path;
    }
    if let Ok(value) = env::var(DB_ENV) {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }
    data_root.join("filings.sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_args() -> LoadArgs {
        LoadArgs {
            data_root: PathBuf::from(".cache/idx-filings"),
            workbook: Some(PathBuf::from("FinancialStatement-2023-I-BBRI.xlsx")),
            pdf: Some(PathBuf::from("AR-BBRI-2023.pdf")),
            db_path: Some(PathBuf::from("filings.sqlite")),
            note_pages: "384-387".to_string(),
            reports: Vec::new(),
            quarter: None,
            entity_name: None,
            entity_code: None,
            threshold: 0.5,
            note_keyword: "Catatan".to_string(),
            report_path: None,
        }
    }

    fn calk_args() -> CalkArgs {
        CalkArgs {
            data_root: PathBuf::from(".cache/idx-filings"),
            pdf: Some(PathBuf::from("AR-BBRI-2023.pdf")),
            db_path: Some(PathBuf::from("filings.sqlite")),
            pages: None,
            scan_marker: None,
            entity_code: None,
            report_path: None,
        }
    }

    #[test]
    fn empty_report_list_means_every_statement() {
        let config = LoadConfig::from_args(load_args()).unwrap();

        assert_eq!(config.reports, ReportKind::all().to_vec());
    }

    #[test]
    fn repeated_reports_collapse_in_order() {
        let mut args = load_args();
        args.reports = vec![
            ReportKind::CashFlow,
            ReportKind::BalanceSheet,
            ReportKind::CashFlow,
        ];
        let config = LoadConfig::from_args(args).unwrap();

        assert_eq!(
            config.reports,
            vec![ReportKind::CashFlow, ReportKind::BalanceSheet]
        );
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let mut args = load_args();
        args.threshold = 1.5;

        let err = LoadConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn blank_note_keyword_is_rejected() {
        let mut args = load_args();
        args.note_keyword = "   ".to_string();

        assert!(LoadConfig::from_args(args).is_err());
    }

    #[test]
    fn calk_defaults_to_the_marker_scan() {
        let config = CalkConfig::from_args(calk_args()).unwrap();

        match config.pages {
            PageSelection::Marker(marker) => assert_eq!(marker, DEFAULT_SCAN_MARKER),
            other => panic!("expected marker scan, got {other:?}"),
        }
    }

    #[test]
    fn calk_rejects_both_page_selections_at_once() {
        let mut both = calk_args();
        both.pages = Some("395-454".to_string());
        both.scan_marker = Some("CATATAN ATAS LAPORAN KEUANGAN".to_string());

        assert!(CalkConfig::from_args(both).is_err());
    }

    #[test]
    fn calk_accepts_a_page_range() {
        let mut args = calk_args();
        args.pages = Some("395-454".to_string());

        let config = CalkConfig::from_args(args).unwrap();
        assert!(matches!(config.pages, PageSelection::Range(_)));
    }

    #[test]
    fn calk_rejects_a_blank_marker() {
        let mut args = calk_args();
        args.scan_marker = Some("  ".to_string());

        assert!(CalkConfig::from_args(args).is_err());
    }
}
