//! Permission grant repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use daghbas_core::result::AppResult;
use daghbas_entity::permission::PermissionGrant;

use super::db_error;

/// Repository for the flat (user, folder) grant table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantRepository;

impl GrantRepository {
    /// Find the grant for a user on a folder.
    pub async fn find(
        conn: &mut PgConnection,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Option<PermissionGrant>> {
        sqlx::query_as::<_, PermissionGrant>(
            "SELECT * FROM folder_permissions WHERE user_id = $1 AND folder_id = $2",
        )
        .bind(user_id)
        .bind(folder_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to find permission grant", e))
    }

    /// Insert a grant or overwrite the flags of the existing row.
    pub async fn upsert(
        conn: &mut PgConnection,
        grant: &PermissionGrant,
    ) -> AppResult<PermissionGrant> {
        sqlx::query_as::<_, PermissionGrant>(
            "INSERT INTO folder_permissions \
             (id, user_id, folder_id, can_read, can_write, can_delete, granted_by, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id, folder_id) DO UPDATE SET \
             can_read = EXCLUDED.can_read, can_write = EXCLUDED.can_write, \
             can_delete = EXCLUDED.can_delete, granted_by = EXCLUDED.granted_by, \
             updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(grant.id)
        .bind(grant.user_id)
        .bind(grant.folder_id)
        .bind(grant.can_read)
        .bind(grant.can_write)
        .bind(grant.can_delete)
        .bind(grant.granted_by)
        .bind(grant.updated_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to upsert permission grant", e))
    }

    /// Delete the grant for a user on a folder.
    pub async fn delete(conn: &mut PgConnection, user_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM folder_permissions WHERE user_id = $1 AND folder_id = $2")
                .bind(user_id)
                .bind(folder_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| db_error("Failed to delete permission grant", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// List every grant on a folder.
    pub async fn find_by_folder(
        conn: &mut PgConnection,
        folder_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        sqlx::query_as::<_, PermissionGrant>(
            "SELECT * FROM folder_permissions WHERE folder_id = $1 ORDER BY updated_at ASC",
        )
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to list permission grants", e))
    }
}
