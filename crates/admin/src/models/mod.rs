//! Domain models for the admin.
//!
//! Records are decoded leniently: missing optional fields default and
//! unknown fields are ignored, since the store has no schema and the
//! mobile apps that write most records have changed shape over time.

pub mod account;
pub mod banner;
pub mod booking;
pub mod company;
pub mod faq;
pub mod message;
pub mod session;
pub mod user;

use serde::Serialize;

pub use account::Account;
pub use banner::Banner;
pub use booking::{Booking, StatusFilter};
pub use company::{Company, CompanyView, Review, Service, ServiceView};
pub use faq::{Faq, FaqList};
pub use message::Message;
pub use session::{CurrentAdmin, keys as session_keys};
pub use user::{User, UserView};

/// A record paired with its store key, as returned by the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct Keyed<K, T> {
    /// Store key of the record.
    pub key: K,
    /// Record body.
    #[serde(flatten)]
    pub record: T,
}

impl<K, T> Keyed<K, T> {
    /// Pair a record with its key.
    pub const fn new(key: K, record: T) -> Self {
        Self { key, record }
    }
}

/// Deserializers that accept the loosely typed values found in the store.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Epoch milliseconds stored as an integer, a float or a numeric string.
    pub fn epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(float_to_millis)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(float_to_millis),
            _ => None,
        }))
    }

    /// A number stored as a number or a numeric string.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    /// A string, accepting scalars of other types; objects become `None`.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }))
    }

    #[allow(clippy::cast_possible_truncation)] // epoch millis fit comfortably in i64
    fn float_to_millis(f: f64) -> i64 {
        f.round() as i64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient::epoch_millis")]
        at: Option<i64>,
        #[serde(default, deserialize_with = "lenient::number")]
        rating: Option<f64>,
        #[serde(default, deserialize_with = "lenient::string")]
        price: Option<String>,
    }

    #[test]
    fn test_lenient_fields_accept_mixed_types() {
        let s: Sample =
            serde_json::from_value(json!({"at": 1.7e12, "rating": "4.5", "price": 25})).unwrap();
        assert_eq!(s.at, Some(1_700_000_000_000));
        assert_eq!(s.rating, Some(4.5));
        assert_eq!(s.price.as_deref(), Some("25"));
    }

    #[test]
    fn test_lenient_fields_default_when_missing_or_odd() {
        let s: Sample = serde_json::from_value(json!({"price": {"amount": 1}})).unwrap();
        assert_eq!(s.at, None);
        assert_eq!(s.rating, None);
        assert_eq!(s.price, None);
    }

    #[test]
    fn test_keyed_flattens_record() {
        let keyed = Keyed::new("k1", json!({"title": "Sale"}));
        let value = serde_json::to_value(&keyed).unwrap();
        assert_eq!(value, json!({"key": "k1", "title": "Sale"}));
    }
}
