//! Newtype record keys for type-safe entity references.
//!
//! Every record in the document store is addressed by the key assigned when
//! it was created. Keys are plain strings on the wire, but a key is also a
//! path segment: a key containing `/` would address a different record.
//! The `define_key!` macro creates wrappers that validate this once, at the
//! boundary, and prevent mixing keys of different entity types.

use thiserror::Error;

/// Maximum key length in bytes accepted by the document store.
pub const MAX_KEY_BYTES: usize = 768;

/// Characters the document store forbids inside a key.
const FORBIDDEN_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Errors that can occur when parsing a record key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key is empty.
    #[error("key cannot be empty")]
    Empty,
    /// The key exceeds the store's length limit.
    #[error("key must be at most {max} bytes")]
    TooLong {
        /// Maximum allowed length in bytes.
        max: usize,
    },
    /// The key contains a character the store does not allow.
    #[error("key contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// Common behavior of all record key types.
pub trait RecordKey:
    Clone + Ord + std::hash::Hash + std::fmt::Display + std::fmt::Debug + Send + Sync + 'static
{
    /// Parse and validate a key.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` if the key is empty, too long, or contains a
    /// forbidden character.
    fn parse(s: &str) -> Result<Self, KeyError>;

    /// The key as a string slice (a single path segment).
    fn as_str(&self) -> &str;
}

/// Validate a raw key string against the store's key rules.
///
/// # Errors
///
/// Returns `KeyError` describing the first rule the key violates.
pub fn validate_key(s: &str) -> Result<(), KeyError> {
    if s.is_empty() {
        return Err(KeyError::Empty);
    }
    if s.len() > MAX_KEY_BYTES {
        return Err(KeyError::TooLong { max: MAX_KEY_BYTES });
    }
    if let Some(c) = s
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_ascii_control())
    {
        return Err(KeyError::ForbiddenChar(c));
    }
    Ok(())
}

/// Macro to define a type-safe record key wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string (validated on deserialize)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - `Display`, `FromStr`, `AsRef<str>` and the [`RecordKey`] trait
///
/// # Example
///
/// ```rust
/// # use taskmaster_core::{define_key, RecordKey};
/// define_key!(WidgetKey);
///
/// let key = WidgetKey::parse("-NxAbc123").unwrap();
/// assert_eq!(key.as_str(), "-NxAbc123");
/// assert!(WidgetKey::parse("a/b").is_err());
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $crate::RecordKey for $name {
            fn parse(s: &str) -> ::core::result::Result<Self, $crate::KeyError> {
                $crate::validate_key(s)?;
                Ok(Self(s.to_owned()))
            }

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::KeyError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                <Self as $crate::RecordKey>::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::KeyError;

            fn try_from(s: String) -> ::core::result::Result<Self, Self::Error> {
                $crate::validate_key(&s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard record keys
define_key!(UserKey);
define_key!(CompanyKey);
define_key!(ServiceKey);
define_key!(ReviewKey);
define_key!(BookingKey);
define_key!(MessageKey);
define_key!(BannerKey);
define_key!(AccountKey);
