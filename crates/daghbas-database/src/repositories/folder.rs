//! Folder repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use daghbas_core::result::AppResult;
use daghbas_entity::folder::Folder;

use super::db_error;

/// Repository for folder rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderRepository;

impl FolderRepository {
    /// Find a folder by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to find folder", e))
    }

    /// Find a folder by ID with a shared row lock.
    ///
    /// Concurrent uploads into the folder may proceed together; a delete
    /// of the folder waits for them.
    pub async fn find_for_share(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to lock folder", e))
    }

    /// Find a folder by ID with an exclusive row lock.
    pub async fn find_for_update(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to lock folder", e))
    }

    /// List all folders.
    pub async fn find_all(conn: &mut PgConnection) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders ORDER BY name ASC, id ASC")
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to list folders", e))
    }

    /// List direct children of a folder.
    pub async fn find_children(conn: &mut PgConnection, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC, id ASC",
        )
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to list child folders", e))
    }

    /// Insert a folder.
    pub async fn create(conn: &mut PgConnection, folder: &Folder) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO folders (id, name, parent_id, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(folder.created_by)
        .bind(folder.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to create folder", e))?;
        Ok(())
    }

    /// Delete a folder.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to delete folder", e))?;
        Ok(result.rows_affected() > 0)
    }
}
