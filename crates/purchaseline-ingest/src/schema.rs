//! `purchases` table definition.

use duckdb::Connection;
use purchaseline_core::SchemaError;

/// Target table name.
pub const TABLE: &str = "purchases";

/// DDL for the id sequence and the table. `IF NOT EXISTS` keeps it idempotent.
pub fn create_purchases_table() -> &'static str {
    "CREATE SEQUENCE IF NOT EXISTS purchases_id_seq START 1;
     CREATE TABLE IF NOT EXISTS purchases (
       id       INTEGER PRIMARY KEY DEFAULT nextval('purchases_id_seq'),
       user_id  INTEGER,
       date     DATE,
       price    INTEGER,
       UNIQUE (date, price, user_id)
     )"
}

/// Parameterized insert of one row; `id` comes from the sequence.
pub fn insert_purchase() -> &'static str {
    "INSERT INTO purchases (user_id, date, price) VALUES (?, CAST(? AS DATE), ?)"
}

/// Row count of the table.
pub fn count_purchases() -> &'static str {
    "SELECT COUNT(*) FROM purchases"
}

/// Ensure the `purchases` table exists.
pub fn ensure_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(create_purchases_table())
        .map_err(|e| SchemaError(format!("failed to create table {TABLE}: {e}")))?;
    log::debug!("Table {TABLE} ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'purchases'",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        for _ in 0..3 {
            ensure_schema(&conn).unwrap();
        }
        assert_eq!(table_count(&conn), 1);
    }

    #[test]
    fn columns_match_definition() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_name = 'purchases' ORDER BY ordinal_position",
            )
            .unwrap();
        let columns: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            vec![
                ("id".to_string(), "INTEGER".to_string()),
                ("user_id".to_string(), "INTEGER".to_string()),
                ("date".to_string(), "DATE".to_string()),
                ("price".to_string(), "INTEGER".to_string()),
            ]
        );
    }

    #[test]
    fn ids_autoincrement() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(insert_purchase(), duckdb::params![1, "2012-06-01", 10])
            .unwrap();
        conn.execute(insert_purchase(), duckdb::params![2, "2012-06-02", 20])
            .unwrap();
        let ids: (i64, i64) = conn
            .query_row("SELECT MIN(id), MAX(id) FROM purchases", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(ids, (1, 2));
    }

    #[test]
    fn unique_constraint_rejects_duplicates() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(insert_purchase(), duckdb::params![1, "2012-06-01", 10])
            .unwrap();
        let dup = conn.execute(insert_purchase(), duckdb::params![1, "2012-06-01", 10]);
        assert!(dup.is_err());
    }
}
