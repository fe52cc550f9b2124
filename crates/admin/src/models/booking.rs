//! Service booking records and the booking status filter.

use serde::{Deserialize, Serialize};

use taskmaster_core::{BookingKey, BookingStatus};

use super::lenient;
use crate::db::Entity;

/// A service booking (`bookings/{id}`).
///
/// `status` is the only field the admin changes. It is kept as the raw
/// stored string so values written by other clients survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Booking {
    pub service_name: String,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub company_id: String,
    /// Scheduled time in epoch milliseconds.
    #[serde(deserialize_with = "lenient::epoch_millis", skip_serializing_if = "Option::is_none")]
    pub booking_time: Option<i64>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub invoice_url: Option<String>,
    #[serde(deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

impl Booking {
    /// Parsed status; `None` when unset or not a known status.
    #[must_use]
    pub fn parsed_status(&self) -> Option<BookingStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Whether no status has been recorded (absent or empty).
    #[must_use]
    pub fn has_no_status(&self) -> bool {
        self.status.as_deref().is_none_or(str::is_empty)
    }
}

impl Entity for Booking {
    type Key = BookingKey;
    const COLLECTION: &'static str = "bookings";

    fn search_fields<'a>(&'a self, _key: &'a BookingKey) -> Vec<&'a str> {
        vec![
            self.service_name.as_str(),
            self.user_name.as_str(),
            self.user_id.as_str(),
            self.company_id.as_str(),
        ]
    }
}

/// Status dimension of the bookings filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No filtering.
    #[default]
    All,
    /// Bookings with the given status.
    Is(BookingStatus),
    /// Bookings with no status recorded (`none`).
    Unset,
}

impl StatusFilter {
    /// Whether `booking` passes this filter.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        match self {
            Self::All => true,
            Self::Is(status) => booking.parsed_status() == Some(*status),
            Self::Unset => booking.has_no_status(),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "none" => Ok(Self::Unset),
            other => other
                .parse::<BookingStatus>()
                .map(Self::Is)
                .map_err(|_| format!("Unknown status filter: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking(status: Option<&str>) -> Booking {
        Booking {
            service_name: "Plumbing".to_string(),
            status: status.map(String::from),
            ..Booking::default()
        }
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("none".parse::<StatusFilter>().unwrap(), StatusFilter::Unset);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Is(BookingStatus::Completed)
        );
        assert!("cancelled".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_filter_matches() {
        let pending = booking(Some("pending"));
        let unset = booking(None);
        let blank = booking(Some(""));
        let spaced = booking(Some(" "));
        let capitalised = booking(Some("Completed"));
        let odd = booking(Some("rescheduled"));

        assert!(StatusFilter::All.matches(&odd));
        assert!(StatusFilter::Is(BookingStatus::Pending).matches(&pending));
        assert!(!StatusFilter::Is(BookingStatus::Pending).matches(&unset));
        assert!(StatusFilter::Unset.matches(&unset));
        assert!(StatusFilter::Unset.matches(&blank));
        assert!(!StatusFilter::Unset.matches(&spaced));
        assert!(!StatusFilter::Unset.matches(&odd));
        assert!(!StatusFilter::Is(BookingStatus::Completed).matches(&capitalised));
        assert!(!StatusFilter::Is(BookingStatus::Absent).matches(&odd));
    }

    #[test]
    fn test_decode_booking() {
        let b: Booking = serde_json::from_value(json!({
            "serviceName": "Cleaning",
            "userId": "u1",
            "userName": "Ana",
            "companyId": "c1",
            "bookingTime": 1_700_000_000_000_i64,
            "status": "pending",
            "paymentId": "pay_1"
        }))
        .unwrap();
        assert_eq!(b.parsed_status(), Some(BookingStatus::Pending));
        assert_eq!(b.booking_time, Some(1_700_000_000_000));
    }
}
