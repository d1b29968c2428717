//! Device installation repository implementation.

use sqlx::PgConnection;

use daghbas_core::result::AppResult;
use daghbas_entity::installation::Installation;

use super::db_error;

/// Repository for installation rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallationRepository;

impl InstallationRepository {
    /// Take a transaction-scoped advisory lock on a device ID.
    pub async fn lock_device(conn: &mut PgConnection, device_id: &str) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("device:{device_id}"))
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to lock device", e))?;
        Ok(())
    }

    /// Find the installation for a device.
    pub async fn find_by_device(
        conn: &mut PgConnection,
        device_id: &str,
    ) -> AppResult<Option<Installation>> {
        sqlx::query_as::<_, Installation>("SELECT * FROM installations WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to find installation", e))
    }

    /// Insert an installation or overwrite the row for its device.
    pub async fn upsert(conn: &mut PgConnection, installation: &Installation) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO installations \
             (id, device_id, customer_name, license_token, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (device_id) DO UPDATE SET \
             customer_name = EXCLUDED.customer_name, license_token = EXCLUDED.license_token, \
             is_active = EXCLUDED.is_active, updated_at = EXCLUDED.updated_at",
        )
        .bind(installation.id)
        .bind(&installation.device_id)
        .bind(&installation.customer_name)
        .bind(&installation.license_token)
        .bind(installation.is_active)
        .bind(installation.created_at)
        .bind(installation.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to upsert installation", e))?;
        Ok(())
    }
}
