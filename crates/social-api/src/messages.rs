use std::sync::Arc;

use tracing::info;

use social_db::models::MessageRow;
use social_db::{AccountStore, MessageStore};
use social_types::api::MessageRequest;
use social_types::models::Message;

use crate::error::ServiceError;

/// Longest message text accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 254;

/// Posting, editing, deleting and listing messages.
///
/// Holds the account store as well so new messages can be checked against a
/// real author.
pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    accounts: Arc<dyn AccountStore>,
}

impl MessageService {
    pub fn new(messages: Arc<dyn MessageStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { messages, accounts }
    }

    pub fn create_message(&self, candidate: &MessageRequest) -> Result<Message, ServiceError> {
        let posted_by = candidate
            .posted_by
            .ok_or(ServiceError::MessageValidation("postedBy is missing"))?;

        if self.accounts.find_account_by_id(posted_by)?.is_none() {
            return Err(ServiceError::MessageValidation("postedBy is not a registered account"));
        }

        let text = validate_text(candidate.message_text.as_deref())?;
        let row = self
            .messages
            .insert_message(posted_by, text, candidate.time_posted_epoch)?;

        info!("Account {} posted message {}", row.posted_by, row.message_id);
        Ok(message_from_row(row))
    }

    pub fn get_all_messages(&self) -> Result<Vec<Message>, ServiceError> {
        let rows = self.messages.find_all_messages()?;
        Ok(rows.into_iter().map(message_from_row).collect())
    }

    pub fn get_message_by_id(&self, message_id: i64) -> Result<Option<Message>, ServiceError> {
        Ok(self.messages.find_message_by_id(message_id)?.map(message_from_row))
    }

    /// `Some(1)` when a message was removed, `None` when there was nothing to remove.
    pub fn delete_message_by_id(&self, message_id: i64) -> Result<Option<u32>, ServiceError> {
        if self.messages.find_message_by_id(message_id)?.is_none() {
            return Ok(None);
        }

        if !self.messages.delete_message_by_id(message_id)? {
            // Removed by someone else after the lookup.
            return Ok(None);
        }

        info!("Deleted message {}", message_id);
        Ok(Some(1))
    }

    /// Replaces the text of an existing message, leaving its author and
    /// timestamp alone. The author is not re-checked.
    pub fn update_message_text(
        &self,
        message_id: i64,
        new_text: Option<&str>,
    ) -> Result<u32, ServiceError> {
        if self.messages.find_message_by_id(message_id)?.is_none() {
            return Err(ServiceError::MessageValidation("no message with that id"));
        }

        let text = validate_text(new_text)?;
        if !self.messages.update_message_text(message_id, text)? {
            return Err(ServiceError::MessageValidation("no message with that id"));
        }

        info!("Updated text of message {}", message_id);
        Ok(1)
    }

    pub fn get_messages_by_account(&self, account_id: i64) -> Result<Vec<Message>, ServiceError> {
        let rows = self.messages.find_messages_by_account(account_id)?;
        Ok(rows.into_iter().map(message_from_row).collect())
    }
}

fn validate_text(text: Option<&str>) -> Result<&str, ServiceError> {
    let text = text.unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ServiceError::MessageValidation("message text is blank"));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ServiceError::MessageValidation("message text is longer than 254 characters"));
    }

    Ok(text)
}

fn message_from_row(row: MessageRow) -> Message {
    Message {
        message_id: row.message_id,
        posted_by: row.posted_by,
        message_text: row.message_text,
        time_posted_epoch: row.time_posted_epoch,
    }
}
