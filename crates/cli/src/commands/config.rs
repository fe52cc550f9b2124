//! Configuration checks.

use tracing::info;

use taskmaster_admin::config::AdminConfig;

/// Load the admin configuration the way the server does and report it.
///
/// Secrets are validated but never printed.
///
/// # Errors
///
/// Returns the `ConfigError` the server would fail with at startup.
pub fn check() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;

    info!("Configuration OK");
    info!("  Listen: {}", config.socket_addr());
    info!("  Base URL: {}", config.base_url);
    info!("  Secure cookies: {}", config.is_secure());
    info!("  TLS: {}", if config.tls.is_some() { "enabled" } else { "disabled" });
    info!("  Database: {}", config.firebase.database_url);
    info!("  Storage bucket: {}", config.firebase.storage_bucket);
    info!("  Mirror TTL: {}s", config.mirror_ttl.as_secs());
    info!(
        "  Sentry: {}",
        if config.sentry_dsn.is_some() { "enabled" } else { "disabled" }
    );

    Ok(())
}
