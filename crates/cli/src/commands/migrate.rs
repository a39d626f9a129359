//! Database migrations.
//!
//! Migrations live in the workspace `migrations/` directory and are embedded
//! at compile time. Neither server runs them on startup.

use super::{CommandError, connect};

/// Apply every pending migration.
///
/// # Errors
///
/// Returns an error if the connection fails or a migration does not apply.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
