//! Reference data seeding.

use dar_koftan_core::types::size::all_sizes;

use super::{CommandError, connect};

/// Insert every size label from the size groups. Labels already present
/// keep their row.
///
/// # Errors
///
/// Returns an error if the connection or an insert fails.
pub async fn sizes() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut tx = pool.begin().await?;

    let mut inserted = 0_u64;
    for (value, group) in all_sizes() {
        inserted += sqlx::query(
            "INSERT INTO shop.size (value, size_group) VALUES ($1, $2) ON CONFLICT (value) DO NOTHING",
        )
        .bind(value)
        .bind(group)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;

    tracing::info!(inserted, "Sizes seeded");
    Ok(())
}
