use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::SheetRegion;

#[derive(Parser, Debug)]
#[command(
    name = "idx-filings",
    version,
    about = "Local IDX financial statement extraction and loading tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Load(LoadArgs),
    Calk(CalkArgs),
    Inspect(InspectArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[arg(long, default_value = ".cache/idx-filings")]
    pub data_root: PathBuf,

    /// IDX FinancialStatement workbook (falls back to FILINGS_WORKBOOK).
    #[arg(long)]
    pub workbook: Option<PathBuf>,

    /// Annual-report PDF containing the notes pages (falls back to FILINGS_PDF).
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// 1-indexed PDF pages holding the footnote summaries, e.g. "384-387".
    #[arg(long)]
    pub note_pages: String,

    #[arg(long = "report", value_enum)]
    pub reports: Vec<ReportKind>,

    /// Quarter label override; otherwise derived from the workbook filename.
    #[arg(long)]
    pub quarter: Option<String>,

    #[arg(long)]
    pub entity_name: Option<String>,

    #[arg(long)]
    pub entity_code: Option<String>,

    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,

    #[arg(long, default_value = "Catatan")]
    pub note_keyword: String,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CalkArgs {
    #[arg(long, default_value = ".cache/idx-filings")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub pdf: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// 1-indexed page range of the notes section, e.g. "395-454". Without
    /// it, every page containing the scan marker is used.
    #[arg(long)]
    pub pages: Option<String>,

    /// Phrase identifying notes pages when no explicit range is given
    /// (default: the CALK chapter heading).
    #[arg(long)]
    pub scan_marker: Option<String>,

    #[arg(long)]
    pub entity_code: Option<String>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long, default_value = ".cache/idx-filings")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub workbook: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/idx-filings")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl ReportKind {
    pub fn all() -> [Self; 3] {
        [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow]
    }

    /// Sheet identifier inside the IDX FinancialStatement workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::BalanceSheet => "4220000",
            Self::IncomeStatement => "4312000",
            Self::CashFlow => "4510000",
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow",
        }
    }

    /// Where the item labels and current-period values sit on the sheet.
    /// IDX statement sheets share one layout: labels in column A, values
    /// in column B, data starting on the fourth row.
    pub fn region(self) -> SheetRegion {
        SheetRegion {
            sheet: self.sheet_name(),
            first_row: 3,
            label_column: 0,
            value_column: 1,
        }
    }
}
