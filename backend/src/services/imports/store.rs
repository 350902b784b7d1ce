//! SQLite persistence for imported rows.
//!
//! Every accepted row is stored as one record of `imported_rows`, keyed by
//! the batch (one upload) it came from. The row itself is kept as a JSON
//! object mapping header to cell, so all import kinds share one table.

use common::model::ImportKind;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Rows written per transaction; progress is reported at the same pace.
pub const ROWS_PER_TRANSACTION: usize = 500;

/// Opens the database at `path`, creating the schema if needed.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS imported_rows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            batch_id TEXT NOT NULL,
            import_kind TEXT NOT NULL,
            row_number INTEGER NOT NULL,
            data TEXT NOT NULL,
            imported_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_imported_rows_batch ON imported_rows (batch_id);",
    )?;
    Ok(conn)
}

/// Inserts `rows` in one transaction.
///
/// `first_row_number` is the display row number (header = 1) of `rows[0]`.
/// Cells beyond the header are ignored, missing cells are stored as "".
pub fn insert_rows(
    conn: &mut Connection,
    batch_id: &str,
    kind: ImportKind,
    header: &[String],
    rows: &[Vec<String>],
    first_row_number: usize,
) -> rusqlite::Result<usize> {
    let imported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO imported_rows (batch_id, import_kind, row_number, data, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (offset, row) in rows.iter().enumerate() {
            let data = row_to_json(header, row);
            stmt.execute(params![
                batch_id,
                kind.slug(),
                (first_row_number + offset) as i64,
                data,
                imported_at
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn count_rows(conn: &Connection, batch_id: &str) -> rusqlite::Result<usize> {
    conn.query_row(
        "SELECT COUNT(*) FROM imported_rows WHERE batch_id = ?1",
        params![batch_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
}

fn row_to_json(header: &[String], row: &[String]) -> String {
    let object: Map<String, Value> = header
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            let cell = row.get(idx).cloned().unwrap_or_default();
            (title.clone(), Value::String(cell))
        })
        .collect();
    Value::Object(object).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn stores_rows_as_json_objects() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open(&dir.path().join("imports.sqlite")).unwrap();
        let header = strings(&["Stock Name", "Alert Level"]);
        let rows = vec![strings(&["Flour", "5"]), strings(&["Sugar"])];

        let stored = insert_rows(&mut conn, "batch-1", ImportKind::Stock, &header, &rows, 2).unwrap();
        assert_eq!(stored, 2);
        assert_eq!(count_rows(&conn, "batch-1").unwrap(), 2);
        assert_eq!(count_rows(&conn, "batch-2").unwrap(), 0);

        let (row_number, data): (i64, String) = conn
            .query_row(
                "SELECT row_number, data FROM imported_rows WHERE batch_id = ?1 ORDER BY id DESC LIMIT 1",
                params!["batch-1"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(row_number, 3);
        let value: Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["Stock Name"], "Sugar");
        assert_eq!(value["Alert Level"], "");
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imports.sqlite");
        {
            let mut conn = open(&path).unwrap();
            let header = strings(&["A"]);
            insert_rows(&mut conn, "b", ImportKind::Products, &header, &[strings(&["1"])], 2).unwrap();
        }
        let conn = open(&path).unwrap();
        assert_eq!(count_rows(&conn, "b").unwrap(), 1);
    }
}
