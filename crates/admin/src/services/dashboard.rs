//! Dashboard statistics over the marketplace collections.

use serde::Serialize;

use taskmaster_core::BookingStatus;

use crate::db::{DocumentStore, Records, Repository, RepositoryError};
use crate::models::{Booking, Company, Message, User};
use crate::state::AppState;

/// Headline counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_companies: usize,
    /// Services summed across all companies.
    pub total_services: usize,
    pub total_bookings: usize,
    pub pending_bookings: usize,
    pub completed_bookings: usize,
    /// Bookings neither pending nor completed, including unset statuses.
    pub other_bookings: usize,
    pub total_messages: usize,
}

impl DashboardStats {
    /// Compute the statistics from loaded collections.
    #[must_use]
    pub fn compute(
        users: &Records<User>,
        companies: &Records<Company>,
        bookings: &Records<Booking>,
        messages: &Records<Message>,
    ) -> Self {
        let count = |status: BookingStatus| {
            bookings
                .values()
                .filter(|b| b.parsed_status() == Some(status))
                .count()
        };
        let pending_bookings = count(BookingStatus::Pending);
        let completed_bookings = count(BookingStatus::Completed);

        Self {
            total_users: users.len(),
            total_companies: companies.len(),
            total_services: companies.values().map(|c| c.services.len()).sum(),
            total_bookings: bookings.len(),
            pending_bookings,
            completed_bookings,
            other_bookings: bookings.len() - pending_bookings - completed_bookings,
            total_messages: messages.len(),
        }
    }

    /// Load the four collections concurrently through the state's mirrors.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any collection fails to load.
    pub async fn load(state: &AppState, refresh: bool) -> Result<Self, RepositoryError> {
        let mirrors = state.mirrors();
        let (user_repo, company_repo, booking_repo, message_repo) =
            (state.repo(), state.repo(), state.repo(), state.repo());
        let (users, companies, bookings, messages) = tokio::try_join!(
            mirrors.users.load(&user_repo, refresh),
            mirrors.companies.load(&company_repo, refresh),
            mirrors.bookings.load(&booking_repo, refresh),
            mirrors.messages.load(&message_repo, refresh),
        )?;
        Ok(Self::compute(&users, &companies, &bookings, &messages))
    }

    /// Load the four collections concurrently straight from the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any collection fails to load.
    pub async fn collect(store: &dyn DocumentStore) -> Result<Self, RepositoryError> {
        let users = Repository::<User>::new(store);
        let companies = Repository::<Company>::new(store);
        let bookings = Repository::<Booking>::new(store);
        let messages = Repository::<Message>::new(store);
        let (users, companies, bookings, messages) =
            tokio::try_join!(users.list(), companies.list(), bookings.list(), messages.list())?;
        Ok(Self::compute(&users, &companies, &bookings, &messages))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fake::FakeDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_collect_counts() {
        let store = FakeDocumentStore::with_root(json!({
            "users": {"u1": {"email": "a@x.co"}, "u2": {"email": "b@x.co"}},
            "companies": {
                "c1": {"services": {"s1": {"serviceName": "A"}, "s2": {"serviceName": "B"}}},
                "c2": {"services": {"s3": {"serviceName": "C"}}},
                "c3": {"name": "no services yet"}
            },
            "bookings": {
                "b1": {"status": "pending"},
                "b2": {"status": "completed"},
                "b3": {"status": "Completed"},
                "b4": {"status": "absent"},
                "b5": {"serviceName": "unset"}
            },
            "messages": {"m1": {"email": "c@x.co", "message": "hi"}}
        }));

        let stats = DashboardStats::collect(&store).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_users: 2,
                total_companies: 3,
                total_services: 3,
                total_bookings: 5,
                pending_bookings: 1,
                completed_bookings: 1,
                other_bookings: 3,
                total_messages: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_collect_empty_store() {
        let store = FakeDocumentStore::new();
        let stats = DashboardStats::collect(&store).await.unwrap();
        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_collect_fails_when_store_fails() {
        let store = FakeDocumentStore::new();
        store.fail_reads(true);
        assert!(DashboardStats::collect(&store).await.is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(DashboardStats::default()).unwrap();
        assert!(value.get("totalServices").is_some());
        assert!(value.get("otherBookings").is_some());
    }
}
