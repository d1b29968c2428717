//! File record repository implementation.

use sqlx::PgConnection;
use uuid::Uuid;

use daghbas_core::result::AppResult;
use daghbas_entity::file::FileRecord;

use super::db_error;

/// Repository for file record rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepository;

impl FileRepository {
    /// Find a file by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to find file", e))
    }

    /// Find a file by ID and take its row lock for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to lock file", e))
    }

    /// Take a transaction-scoped advisory lock on `(folder_id, name)`.
    pub async fn lock_name(conn: &mut PgConnection, folder_id: Uuid, name: &str) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("file:{folder_id}/{name}"))
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to lock file name", e))?;
        Ok(())
    }

    /// Find a file by folder ID and exact name.
    pub async fn find_by_folder_and_name(
        conn: &mut PgConnection,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE folder_id = $1 AND original_name = $2 FOR UPDATE",
        )
        .bind(folder_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to find file by name", e))
    }

    /// List files in a folder.
    pub async fn find_by_folder(
        conn: &mut PgConnection,
        folder_id: Uuid,
    ) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files WHERE folder_id = $1 ORDER BY original_name ASC",
        )
        .bind(folder_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to list files", e))
    }

    /// Count files in a folder.
    pub async fn count_by_folder(conn: &mut PgConnection, folder_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to count files", e))
    }

    /// Insert a new file record.
    pub async fn create(conn: &mut PgConnection, file: &FileRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO files (id, folder_id, stored_name, original_name, version, size_bytes, \
             checksum_sha256, created_by, created_at, updated_at, locked_by, locked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(file.id)
        .bind(file.folder_id)
        .bind(&file.stored_name)
        .bind(&file.original_name)
        .bind(file.version)
        .bind(file.size_bytes)
        .bind(&file.checksum_sha256)
        .bind(file.created_by)
        .bind(file.created_at)
        .bind(file.updated_at)
        .bind(file.locked_by)
        .bind(file.locked_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to create file record", e))?;
        Ok(())
    }

    /// Update every mutable column of a file record.
    pub async fn update(conn: &mut PgConnection, file: &FileRecord) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE files SET folder_id = $2, version = $3, size_bytes = $4, \
             checksum_sha256 = $5, updated_at = $6, locked_by = $7, locked_at = $8 \
             WHERE id = $1",
        )
        .bind(file.id)
        .bind(file.folder_id)
        .bind(file.version)
        .bind(file.size_bytes)
        .bind(&file.checksum_sha256)
        .bind(file.updated_at)
        .bind(file.locked_by)
        .bind(file.locked_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to update file record", e))?;

        if result.rows_affected() == 0 {
            return Err(daghbas_core::AppError::not_found(format!(
                "File {} not found",
                file.id
            )));
        }
        Ok(())
    }

    /// Delete a file record.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to delete file record", e))?;
        Ok(result.rows_affected() > 0)
    }
}
