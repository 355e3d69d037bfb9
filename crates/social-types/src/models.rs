use serde::{Deserialize, Serialize};

/// A registered account as returned by `/register` and `/login`.
///
/// The password is echoed back exactly as stored; accounts carry no hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: i64,
    pub username: String,
    pub password: String,
}

/// A posted message. `time_posted_epoch` is whatever the client sent, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: i64,
    pub posted_by: i64,
    pub message_text: String,
    pub time_posted_epoch: Option<i64>,
}
