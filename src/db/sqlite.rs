use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use super::DatabaseError;

/// Versioned schema scripts, applied in order.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/001_patients.sql"),
)];

/// Open the patient database at `path`, creating it if needed, and bring
/// the schema up to date.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// In-memory database with the current schema. Used by tests and
/// throwaway servers.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
    Ok(())
}

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = current_schema_version(conn)?;

    for &(version, sql) in MIGRATIONS {
        if version <= current_version {
            continue;
        }
        tracing::info!(version, "Applying patient schema migration");
        conn.execute_batch(sql)
            .map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
    }

    Ok(())
}

/// Recorded schema version; 0 for a database that was never migrated.
fn current_schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let has_version_table = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !has_version_table {
        return Ok(0);
    }

    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn database_initializes_patient_schema() {
        let conn = open_memory_database().unwrap();
        assert_eq!(table_names(&conn), vec!["patients", "schema_version"]);
    }

    #[test]
    fn fresh_connection_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn unreadable_version_table_is_an_error_not_a_rerun() {
        let conn = Connection::open_in_memory().unwrap();
        // A schema_version table without the expected column
        conn.execute_batch("CREATE TABLE schema_version (applied_at TEXT);")
            .unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)), "got {err:?}");
        assert_eq!(table_names(&conn), vec!["schema_version"]);
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn status_check_constraint_rejects_unknown_value() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO patients (first_name, last_name, date_of_birth, status, address, created_at, updated_at)
             VALUES ('Ann', 'Zed', '1990-01-01', 'Archived',
                     '{\"street\":\"1 A St\",\"city\":\"X\",\"state\":\"CA\",\"zipCode\":\"00000\"}',
                     '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn address_check_constraint_rejects_partial_document() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO patients (first_name, last_name, date_of_birth, status, address, created_at, updated_at)
             VALUES ('Ann', 'Zed', '1990-01-01', 'Active', '{\"street\":\"1 A St\"}',
                     '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.db");
        {
            let conn = open_database(&path).unwrap();
            conn.execute(
                "INSERT INTO patients (first_name, last_name, date_of_birth, status, address, created_at, updated_at)
                 VALUES ('Ann', 'Zed', '1990-01-01', 'Active',
                         '{\"street\":\"1 A St\",\"city\":\"X\",\"state\":\"CA\",\"zipCode\":\"00000\"}',
                         '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }
        let conn = open_database(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
