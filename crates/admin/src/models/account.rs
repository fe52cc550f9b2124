//! Admin account records.

use serde::{Deserialize, Serialize};

use taskmaster_core::AccountKey;

use super::lenient;
use crate::db::Entity;

/// An admin account record (`accounts/{id}`).
///
/// Older records also hold a plaintext `password` member. It is never
/// decoded here and is removed whenever the password is changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub email: String,
    /// Last password change in epoch milliseconds.
    #[serde(deserialize_with = "lenient::epoch_millis", skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<i64>,
}

impl Entity for Account {
    type Key = AccountKey;
    const COLLECTION: &'static str = "accounts";

    fn search_fields<'a>(&'a self, _key: &'a AccountKey) -> Vec<&'a str> {
        vec![self.email.as_str()]
    }
}
