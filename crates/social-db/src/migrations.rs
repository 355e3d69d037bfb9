use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (accounts, messages)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                account_id  INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL
            );

            CREATE TABLE messages (
                message_id          INTEGER PRIMARY KEY AUTOINCREMENT,
                posted_by           INTEGER NOT NULL REFERENCES accounts(account_id),
                message_text        TEXT NOT NULL,
                time_posted_epoch   INTEGER
            );

            CREATE INDEX idx_messages_posted_by
                ON messages(posted_by);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
