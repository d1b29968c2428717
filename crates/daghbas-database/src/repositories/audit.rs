//! Audit log repository implementation.
//!
//! The table is append-only; there is no update or delete path.

use sqlx::PgConnection;

use daghbas_core::result::AppResult;
use daghbas_entity::audit::AuditLogEntry;

use super::db_error;

/// Repository for audit log entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogRepository;

impl AuditLogRepository {
    /// Append an audit log entry.
    pub async fn create(conn: &mut PgConnection, entry: &AuditLogEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor_id, action, target_type, target_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.target_type)
        .bind(&entry.target_id)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to append audit entry", e))?;
        Ok(())
    }

    /// Most recent entries, newest first.
    pub async fn find_recent(conn: &mut PgConnection, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to list audit entries", e))
    }

    /// Entries for one target, newest first.
    pub async fn find_by_target(
        conn: &mut PgConnection,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log WHERE target_type = $1 AND target_id = $2 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(target_type)
        .bind(target_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| db_error("Failed to find audit entries for target", e))
    }
}
