use serde::{Deserialize, Deserializer, Serialize};

// -- Accounts --

/// Body of `/register` and `/login`.
///
/// Unknown fields (a client echoing `accountId` back, say) are ignored, and
/// missing or `null` fields default to empty so they fail validation instead
/// of JSON extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// -- Messages --

/// Body of `POST /messages` and `PATCH /messages/{id}`.
///
/// On PATCH only `message_text` is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub posted_by: Option<i64>,
    #[serde(default)]
    pub message_text: Option<String>,
    #[serde(default, alias = "timePosted")]
    pub time_posted_epoch: Option<i64>,
}
