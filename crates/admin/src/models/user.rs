//! Marketplace user records.

use serde::{Deserialize, Serialize};

use taskmaster_core::{UserKey, UserType};

use super::lenient;
use crate::db::Entity;

/// A marketplace user (`users/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub email: String,
    /// Raw `userType` value (`serviceProvider` or `customer`).
    #[serde(deserialize_with = "lenient::string")]
    pub user_type: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl User {
    /// Parsed user type, if recognised.
    #[must_use]
    pub fn kind(&self) -> Option<UserType> {
        self.user_type.as_deref().and_then(UserType::classify)
    }

    /// Profile image URL under either of the field names in use.
    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.profile_image_url
            .as_deref()
            .or(self.profile_image.as_deref())
    }
}

/// User as presented by the users view.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub key: UserKey,
    #[serde(flatten)]
    pub user: User,
    /// Recognised user type; `None` for unknown values.
    pub kind: Option<UserType>,
    pub avatar: Option<String>,
}

impl UserView {
    /// Build the view of one user.
    #[must_use]
    pub fn new(key: UserKey, user: User) -> Self {
        Self {
            key,
            kind: user.kind(),
            avatar: user.avatar().map(String::from),
            user,
        }
    }
}

impl Entity for User {
    type Key = UserKey;
    const COLLECTION: &'static str = "users";

    fn search_fields<'a>(&'a self, _key: &'a UserKey) -> Vec<&'a str> {
        let mut fields = vec![self.email.as_str()];
        fields.extend(self.name.as_deref());
        fields.extend(self.user_type.as_deref());
        fields
    }
}
