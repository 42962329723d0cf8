use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args
        .db_path
        .unwrap_or_else(|| args.data_root.join("filings.sqlite"));

    info!(db = %db_path.display(), "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let schema_version = query_text(
        &connection,
        "SELECT value FROM metadata WHERE key = 'db_schema_version'",
    )
    .unwrap_or_default();
    let updated_at = query_text(
        &connection,
        "SELECT value FROM metadata WHERE key = 'db_updated_at'",
    )
    .unwrap_or_default();
    let statement_lines =
        query_count(&connection, "SELECT COUNT(*) FROM statement_lines").unwrap_or(0);
    let note_sections =
        query_count(&connection, "SELECT COUNT(*) FROM note_sections").unwrap_or(0);

    info!(
        path = %db_path.display(),
        schema_version = %schema_version,
        updated_at = %updated_at,
        statement_lines,
        note_sections,
        "database status"
    );

    if statement_lines > 0 {
        let mut statement = connection.prepare(
            "SELECT entity_code, quarter, category, COUNT(*)
             FROM statement_lines
             GROUP BY entity_code, quarter, category
             ORDER BY entity_code, quarter, category",
        )?;
        let scopes = statement.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        for scope in scopes {
            let (entity_code, quarter, category, rows) = scope?;
            info!(
                entity_code = %entity_code,
                quarter = %quarter,
                category = %category,
                rows,
                "loaded scope"
            );
        }
    }

    Ok(())
}

fn query_text(connection: &Connection, sql: &str) -> Result<String> {
    let value = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(value)
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
