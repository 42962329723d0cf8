use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{Connection, params};

use crate::error::FilingError;
use crate::model::{MatchedRecord, NoteSection};
use crate::util::now_utc_string;

pub const DB_SCHEMA_VERSION: &str = "1";

/// Destination for extracted rows. Loads are replace-style: rows from a
/// previous run of the same scope are dropped before the new ones land.
pub trait RecordSink {
    fn replace_statement_records(
        &mut self,
        records: &[MatchedRecord],
    ) -> Result<usize, FilingError>;

    fn replace_note_sections(
        &mut self,
        entity_code: Option<&str>,
        sections: &[NoteSection],
    ) -> Result<usize, FilingError>;
}

pub struct SqliteSink {
    connection: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self, FilingError> {
        let connection = Connection::open(path).map_err(|err| {
            FilingError::persistence(format!("failed to open {}: {err}", path.display()))
        })?;
        Self::initialize(connection)
    }

    fn initialize(connection: Connection) -> Result<Self, FilingError> {
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }
}

impl RecordSink for SqliteSink {
    fn replace_statement_records(
        &mut self,
        records: &[MatchedRecord],
    ) -> Result<usize, FilingError> {
        let tx = self.connection.transaction()?;

        let scopes: BTreeSet<(&str, &str, &str)> = records
            .iter()
            .map(|record| {
                (
                    record.entity_code.as_str(),
                    record.quarter.as_str(),
                    record.category.as_str(),
                )
            })
            .collect();
        for (entity_code, quarter, category) in scopes {
            tx.execute(
                "DELETE FROM statement_lines
                 WHERE entity_code = ?1 AND quarter = ?2 AND category = ?3",
                [entity_code, quarter, category],
            )?;
        }

        let mut inserted = 0usize;
        {
            let mut statement = tx.prepare(
                "INSERT INTO statement_lines
                     (entity_code, entity_name, quarter, category, item, value, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for record in records {
                statement.execute(params![
                    record.entity_code,
                    record.entity_name,
                    record.quarter,
                    record.category,
                    record.item,
                    record.value,
                    record.notes,
                ])?;
                inserted += 1;
            }
        }
        touch_updated_at(&tx)?;
        tx.commit()?;

        Ok(inserted)
    }

    fn replace_note_sections(
        &mut self,
        entity_code: Option<&str>,
        sections: &[NoteSection],
    ) -> Result<usize, FilingError> {
        let tx = self.connection.transaction()?;
        // IS keeps the delete NULL-safe for runs without an entity code.
        tx.execute(
            "DELETE FROM note_sections WHERE entity_code IS ?1",
            [entity_code],
        )?;

        let mut inserted = 0usize;
        {
            let mut statement = tx.prepare(
                "INSERT INTO note_sections (entity_code, title, subtitle, content)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for section in sections {
                statement.execute(params![
                    entity_code,
                    section.title,
                    section.subtitle,
                    section.content,
                ])?;
                inserted += 1;
            }
        }
        touch_updated_at(&tx)?;
        tx.commit()?;

        Ok(inserted)
    }
}

fn configure_connection(connection: &Connection) -> Result<(), FilingError> {
    connection.pragma_update(None, "journal_mode", "WAL")?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<(), FilingError> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS statement_lines (
            id INTEGER PRIMARY KEY,
            entity_code TEXT NOT NULL,
            entity_name TEXT NOT NULL,
            quarter TEXT NOT NULL,
            category TEXT NOT NULL,
            item TEXT NOT NULL,
            value REAL NOT NULL,
            notes TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_statement_lines_scope
            ON statement_lines (entity_code, quarter, category);
        CREATE TABLE IF NOT EXISTS note_sections (
            id INTEGER PRIMARY KEY,
            entity_code TEXT,
            title TEXT NOT NULL,
            subtitle TEXT,
            content TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_note_sections_entity
            ON note_sections (entity_code);",
    )?;

    connection.execute(
        "INSERT INTO metadata (key, value) VALUES ('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    touch_updated_at(connection)?;
    Ok(())
}

fn touch_updated_at(connection: &Connection) -> Result<(), FilingError> {
    connection.execute(
        "INSERT INTO metadata (key, value) VALUES ('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [now_utc_string()],
    )?;
    Ok(())
}
