//! Online stock sweep, the same routine as `POST /api/admin/stock/aggregate`.

use dar_koftan_admin::db::StockRepository;

use super::{CommandError, connect};

/// Create the missing online rows. Existing online rows are skipped.
///
/// # Errors
///
/// Returns an error if any query fails; nothing is written in that case.
pub async fn aggregate() -> Result<(), CommandError> {
    let pool = connect().await?;

    let summary = StockRepository::new(&pool).aggregate_online().await?;

    tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        "Online stock sweep finished"
    );
    Ok(())
}
