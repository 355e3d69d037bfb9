use crate::models::{AccountRow, MessageRow};
use crate::store::{AccountStore, MessageStore};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row};
use tracing::warn;

const ACCOUNT_COLUMNS: &str = "account_id, username, password";
const MESSAGE_COLUMNS: &str = "message_id, posted_by, message_text, time_posted_epoch";

impl AccountStore for Database {
    fn insert_account(&self, username: &str, password: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO accounts (username, password) VALUES (?1, ?2)",
                (username, password),
            );

            match inserted {
                Ok(_) => Ok(Some(AccountRow {
                    account_id: conn.last_insert_rowid(),
                    username: username.to_string(),
                    password: password.to_string(),
                })),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    warn!("Unique constraint rejected username '{}'", username);
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn find_account_by_id(&self, account_id: i64) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
                rusqlite::params![account_id],
            )
        })
    }

    fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"),
                rusqlite::params![username],
            )
        })
    }

    fn find_account_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1 AND password = ?2"
                ),
                rusqlite::params![username, password],
            )
        })
    }
}

impl MessageStore for Database {
    fn insert_message(
        &self,
        posted_by: i64,
        message_text: &str,
        time_posted_epoch: Option<i64>,
    ) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (posted_by, message_text, time_posted_epoch)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![posted_by, message_text, time_posted_epoch],
            )?;

            Ok(MessageRow {
                message_id: conn.last_insert_rowid(),
                posted_by,
                message_text: message_text.to_string(),
                time_posted_epoch,
            })
        })
    }

    fn find_message_by_id(&self, message_id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?1"
            ))?;
            let row = stmt.query_row([message_id], message_from_row).optional()?;
            Ok(row)
        })
    }

    fn find_all_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY message_id"),
                rusqlite::params![],
            )
        })
    }

    fn find_messages_by_account(&self, account_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE posted_by = ?1 ORDER BY message_id"
                ),
                rusqlite::params![account_id],
            )
        })
    }

    fn update_message_text(&self, message_id: i64, message_text: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET message_text = ?1 WHERE message_id = ?2",
                rusqlite::params![message_text, message_id],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_message_by_id(&self, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE message_id = ?1", [message_id])?;
            Ok(deleted > 0)
        })
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        account_id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: row.get(0)?,
        posted_by: row.get(1)?,
        message_text: row.get(2)?,
        time_posted_epoch: row.get(3)?,
    })
}

fn query_account(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Option<AccountRow>> {
    let mut stmt = conn.prepare(sql)?;
    let row = stmt.query_row(params, account_from_row).optional()?;
    Ok(row)
}

fn query_messages(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_account(username: &str) -> (Database, AccountRow) {
        let db = Database::open_in_memory().unwrap();
        let account = db.insert_account(username, "secret").unwrap().unwrap();
        (db, account)
    }

    #[test]
    fn account_ids_are_generated() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_account("ann", "pass1").unwrap().unwrap();
        let second = db.insert_account("bob", "pass2").unwrap().unwrap();

        assert_ne!(first.account_id, second.account_id);
        assert_eq!(db.find_account_by_id(second.account_id).unwrap(), Some(second));
    }

    #[test]
    fn unique_constraint_rejects_duplicate_username() {
        let (db, _) = db_with_account("ann");
        assert_eq!(db.insert_account("ann", "other").unwrap(), None);
    }

    #[test]
    fn credentials_must_match_exactly() {
        let (db, account) = db_with_account("ann");

        let found = db.find_account_by_credentials("ann", "secret").unwrap();
        assert_eq!(found, Some(account));
        assert_eq!(db.find_account_by_credentials("ann", "Secret").unwrap(), None);
        assert_eq!(db.find_account_by_credentials("Ann", "secret").unwrap(), None);
    }

    #[test]
    fn unknown_account_lookups_are_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.find_account_by_id(42).unwrap(), None);
        assert_eq!(db.find_account_by_username("ghost").unwrap(), None);
    }

    #[test]
    fn message_for_missing_account_violates_foreign_key() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_message(99, "orphan", None).is_err());
    }

    #[test]
    fn messages_are_listed_in_insertion_order() {
        let (db, ann) = db_with_account("ann");
        let bob = db.insert_account("bob", "secret").unwrap().unwrap();

        let a = db.insert_message(ann.account_id, "first", Some(10)).unwrap();
        let b = db.insert_message(bob.account_id, "second", None).unwrap();
        let c = db.insert_message(ann.account_id, "third", None).unwrap();

        assert_eq!(db.find_all_messages().unwrap(), vec![a.clone(), b, c.clone()]);
        assert_eq!(db.find_messages_by_account(ann.account_id).unwrap(), vec![a, c]);
        assert!(db.find_messages_by_account(9999).unwrap().is_empty());
    }

    #[test]
    fn update_touches_only_text() {
        let (db, ann) = db_with_account("ann");
        let msg = db.insert_message(ann.account_id, "draft", Some(5)).unwrap();

        assert!(db.update_message_text(msg.message_id, "final").unwrap());
        let stored = db.find_message_by_id(msg.message_id).unwrap().unwrap();
        assert_eq!(stored.message_text, "final");
        assert_eq!(stored.posted_by, ann.account_id);
        assert_eq!(stored.time_posted_epoch, Some(5));

        assert!(!db.update_message_text(msg.message_id + 1, "nope").unwrap());
    }

    #[test]
    fn delete_reports_whether_a_row_went_away() {
        let (db, ann) = db_with_account("ann");
        let msg = db.insert_message(ann.account_id, "bye", None).unwrap();

        assert!(db.delete_message_by_id(msg.message_id).unwrap());
        assert!(!db.delete_message_by_id(msg.message_id).unwrap());
        assert_eq!(db.find_message_by_id(msg.message_id).unwrap(), None);
    }
}
