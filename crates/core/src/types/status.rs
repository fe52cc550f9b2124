//! Status enums for marketplace records.

use serde::{Deserialize, Serialize};

/// Booking lifecycle status as set by staff.
///
/// Booking records store the status as an optional free string; this enum
/// covers the values the admin may write. Stored values match only when
/// spelled exactly as [`as_str`](Self::as_str) returns them. Records with no status at all
/// are a distinct state (see `StatusFilter::Unset` in the admin crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Booked, not yet delivered.
    Pending,
    /// Service delivered.
    Completed,
    /// Customer did not show up.
    Absent,
}

impl BookingStatus {
    /// All statuses staff can assign.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Absent];

    /// Wire value stored in the booking record.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Absent => "absent",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "absent" => Ok(Self::Absent),
            _ => Err(format!("invalid booking status: {s}")),
        }
    }
}

/// Kind of marketplace user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserType {
    /// Offers services through a company.
    ServiceProvider,
    /// Books services.
    Customer,
}

impl UserType {
    /// Classify a raw `userType` value; unknown values yield `None`.
    #[must_use]
    pub fn classify(raw: &str) -> Option<Self> {
        match raw {
            "serviceProvider" | "provider" => Some(Self::ServiceProvider),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }
}

/// FAQ section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqCategory {
    /// Hardware problems.
    Hardware,
    /// Software problems.
    Software,
}

impl FaqCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 2] = [Self::Hardware, Self::Software];

    /// Path segment under `faqs/`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }
}

impl std::fmt::Display for FaqCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FaqCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hardware" => Ok(Self::Hardware),
            "software" => Ok(Self::Software),
            _ => Err(format!("invalid FAQ category: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_round_trips_through_str() {
        for status in BookingStatus::ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_booking_status_parse_is_exact() {
        assert!("Completed".parse::<BookingStatus>().is_err());
        assert!(" completed".parse::<BookingStatus>().is_err());
        assert!("cancelled".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_booking_status_serde() {
        let json = serde_json::to_string(&BookingStatus::Absent).unwrap();
        assert_eq!(json, "\"absent\"");
    }

    #[test]
    fn test_user_type_classify() {
        assert_eq!(
            UserType::classify("serviceProvider"),
            Some(UserType::ServiceProvider)
        );
        assert_eq!(UserType::classify("customer"), Some(UserType::Customer));
        assert_eq!(UserType::classify("staff"), None);
    }

    #[test]
    fn test_faq_category_parse() {
        assert_eq!("software".parse::<FaqCategory>().unwrap(), FaqCategory::Software);
        assert!("firmware".parse::<FaqCategory>().is_err());
    }
}
