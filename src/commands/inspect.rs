use anyhow::Result;
use tracing::info;

use crate::cli::InspectArgs;
use crate::config::{self, WORKBOOK_ENV};
use crate::model::{SheetEntry, WorkbookManifest};
use crate::sources::WorkbookSource;
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InspectArgs) -> Result<()> {
    let workbook_path = config::resolve_input(args.workbook, WORKBOOK_ENV, "--workbook")?;

    info!(workbook = %workbook_path.display(), "inspecting workbook");

    let sha256 = sha256_file(&workbook_path)?;
    let mut workbook = WorkbookSource::open(&workbook_path)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let (rows, columns) = workbook.sheet_dimensions(&name)?;
        info!(sheet = %name, rows, columns, "workbook sheet");
        sheets.push(SheetEntry {
            name,
            rows,
            columns,
        });
    }

    let manifest = WorkbookManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        workbook: workbook_path.display().to_string(),
        sha256,
        sheet_count: sheets.len(),
        sheets,
    };

    if args.dry_run {
        info!(
            sheet_count = manifest.sheet_count,
            "dry run; manifest not written"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.data_root
            .join("manifests")
            .join("workbook_inventory.json")
    });
    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        path = %manifest_path.display(),
        sheet_count = manifest.sheet_count,
        "wrote workbook manifest"
    );

    Ok(())
}
