//! Customer contact messages.

use serde::{Deserialize, Serialize};

use taskmaster_core::MessageKey;

use super::lenient;
use crate::db::Entity;

/// A message sent through the app's contact form (`messages/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    pub email: String,
    pub message: String,
    /// Sent time in epoch milliseconds.
    #[serde(deserialize_with = "lenient::epoch_millis", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Entity for Message {
    type Key = MessageKey;
    const COLLECTION: &'static str = "messages";

    fn search_fields<'a>(&'a self, _key: &'a MessageKey) -> Vec<&'a str> {
        vec![self.email.as_str(), self.message.as_str()]
    }
}
