//! Print dashboard statistics straight from the document store.

use tracing::info;

use taskmaster_admin::config::FirebaseConfig;
use taskmaster_admin::firebase::RealtimeDatabase;
use taskmaster_admin::services::DashboardStats;

/// Load the collections and print the headline counts.
///
/// # Errors
///
/// Returns an error if environment variables are missing or a collection
/// fails to load.
pub async fn print() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = FirebaseConfig::from_env()?;
    let store = RealtimeDatabase::new(&config)?;
    let stats = DashboardStats::collect(&store).await?;

    info!("Dashboard Statistics");
    info!("====================");
    info!("Users: {}", stats.total_users);
    info!("Companies: {}", stats.total_companies);
    info!("Services: {}", stats.total_services);
    info!("Bookings: {}", stats.total_bookings);
    info!("  Pending: {}", stats.pending_bookings);
    info!("  Completed: {}", stats.completed_bookings);
    info!("  Other: {}", stats.other_bookings);
    info!("Messages: {}", stats.total_messages);

    Ok(())
}
