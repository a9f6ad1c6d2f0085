//! Audit sink
//!
//! 审计日志写入失败不影响业务请求，只记录告警。
//!
//! 在 [`scope`] 内写入的审计行 id 会被收集，请求日志中间件据此把它们
//! 关联到本次请求的 `api_logs` 行。

use std::cell::RefCell;
use std::future::Future;

use shared::models::{LogDetailType, NewLog};
use sqlx::SqlitePool;

use crate::db::repository::log;

tokio::task_local! {
    static REQUEST_AUDIT: RefCell<Vec<i64>>;
}

/// Run `fut`, returning its output and the audit row ids it wrote
pub async fn scope<F: Future>(fut: F) -> (F::Output, Vec<i64>) {
    REQUEST_AUDIT
        .scope(RefCell::new(Vec::new()), async move {
            let output = fut.await;
            let ids = REQUEST_AUDIT.with(|ids| ids.take());
            (output, ids)
        })
        .await
}

/// Append an audit row, logging (not returning) failures
pub async fn record(pool: &SqlitePool, entry: NewLog) {
    let detail_type = entry.log_detail_type.map(|d| d.code());
    match log::insert(pool, &entry).await {
        Ok(id) => {
            // 不在请求作用域内时忽略
            let _ = REQUEST_AUDIT.try_with(|ids| ids.borrow_mut().push(id));
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                log_type = ?entry.log_type,
                detail_type = ?detail_type,
                "Failed to write audit log"
            );
        }
    }
}

/// Admin action by `user_id`
pub async fn admin(pool: &SqlitePool, user_id: i64, detail_type: LogDetailType) {
    record(pool, NewLog::admin(user_id, detail_type)).await;
}

/// Admin action with a free-form detail (target id, counts ...)
pub async fn admin_with(
    pool: &SqlitePool,
    user_id: i64,
    detail_type: LogDetailType,
    detail: impl Into<String>,
) {
    record(pool, NewLog::admin(user_id, detail_type).with_detail(detail)).await;
}

/// Session event of a (possibly unknown) user
pub async fn user(pool: &SqlitePool, user_id: Option<i64>, detail_type: LogDetailType) {
    record(pool, NewLog::user(user_id, detail_type)).await;
}

/// Process lifecycle event
pub async fn system(pool: &SqlitePool, detail_type: LogDetailType) {
    record(pool, NewLog::system(detail_type)).await;
}
