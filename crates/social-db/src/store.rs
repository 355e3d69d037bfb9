//! Storage capabilities the rules layer is written against.
//!
//! `Database` is the only production implementation; the traits exist so the
//! services receive their store at construction instead of reaching for a
//! global.

use anyhow::Result;

use crate::models::{AccountRow, MessageRow};

pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Returns `None` when the username is already
    /// taken according to the table's unique constraint.
    fn insert_account(&self, username: &str, password: &str) -> Result<Option<AccountRow>>;

    fn find_account_by_id(&self, account_id: i64) -> Result<Option<AccountRow>>;

    fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRow>>;

    /// Exact match on both fields.
    fn find_account_by_credentials(&self, username: &str, password: &str)
    -> Result<Option<AccountRow>>;
}

pub trait MessageStore: Send + Sync {
    fn insert_message(
        &self,
        posted_by: i64,
        message_text: &str,
        time_posted_epoch: Option<i64>,
    ) -> Result<MessageRow>;

    fn find_message_by_id(&self, message_id: i64) -> Result<Option<MessageRow>>;

    /// All messages in insertion order.
    fn find_all_messages(&self) -> Result<Vec<MessageRow>>;

    fn find_messages_by_account(&self, account_id: i64) -> Result<Vec<MessageRow>>;

    /// Replaces the text of one message. Returns whether a row was changed.
    fn update_message_text(&self, message_id: i64, message_text: &str) -> Result<bool>;

    /// Returns whether a row was deleted.
    fn delete_message_by_id(&self, message_id: i64) -> Result<bool>;
}
