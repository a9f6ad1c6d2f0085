//! Api catalog reconciliation
//!
//! The HTTP layer describes every permission-checked route with an
//! [`ApiCatalogEntry`]. [`refresh_apis`] brings the `apis` table in line with
//! that catalog in one transaction.

use std::collections::HashMap;

use serde::Serialize;
use shared::AppError;
use shared::models::{ApiCreate, ApiRefreshSummary, MethodType};
use sqlx::SqlitePool;

use crate::db::repository::api;

/// One routable, permission-checked endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCatalogEntry {
    pub method: MethodType,
    pub path: &'static str,
    pub summary: &'static str,
    pub tags: &'static [&'static str],
}

impl ApiCatalogEntry {
    pub const fn new(
        method: MethodType,
        path: &'static str,
        summary: &'static str,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            method,
            path,
            summary,
            tags,
        }
    }

    fn tag_vec(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.to_string()).collect()
    }
}

/// Create missing apis, refresh changed summaries / tags and delete apis that
/// are no longer routed
///
/// Grants of deleted apis go with them (`ON DELETE CASCADE`).
pub async fn refresh_apis(
    pool: &SqlitePool,
    catalog: &[ApiCatalogEntry],
) -> Result<ApiRefreshSummary, AppError> {
    let mut tx = pool.begin().await.map_err(|e| AppError::database(e.to_string()))?;
    let existing = api::all(&mut tx).await?;

    let mut wanted: HashMap<(MethodType, &str), &ApiCatalogEntry> = HashMap::new();
    for entry in catalog {
        wanted.entry((entry.method, entry.path)).or_insert(entry);
    }

    let mut summary = ApiRefreshSummary::default();
    let mut seen = std::collections::HashSet::new();

    for row in &existing {
        match wanted.get(&(row.method, row.path.as_str())) {
            Some(entry) => {
                seen.insert((row.method, row.path.as_str()));
                let tags = entry.tag_vec();
                if row.summary != entry.summary || row.tags != tags {
                    api::update_meta(&mut tx, row.id, entry.summary, &tags).await?;
                    summary.updated += 1;
                }
            }
            None => {
                if api::delete_in(&mut tx, row.id).await? {
                    tracing::info!(api_id = row.id, method = %row.method, path = %row.path, "Removed unrouted api");
                    summary.deleted += 1;
                }
            }
        }
    }

    for entry in catalog {
        if !seen.insert((entry.method, entry.path)) {
            continue;
        }
        api::insert(
            &mut tx,
            &ApiCreate {
                path: entry.path.to_string(),
                method: entry.method,
                summary: entry.summary.to_string(),
                tags: entry.tag_vec(),
                status: None,
            },
        )
        .await?;
        summary.created += 1;
    }

    tx.commit().await.map_err(|e| AppError::database(e.to_string()))?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::routes::api_catalog;

    #[tokio::test]
    async fn test_seed_matches_catalog() {
        let db = DbService::in_memory().await.unwrap();
        let summary = refresh_apis(&db.pool, &api_catalog()).await.unwrap();
        assert_eq!(summary, ApiRefreshSummary::default());
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let db = DbService::in_memory().await.unwrap();
        let catalog = vec![
            ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/users", "List users", &["Users"]),
            ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/widgets", "List widgets", &[]),
        ];

        let summary = refresh_apis(&db.pool, &catalog).await.unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);
        assert!(summary.deleted > 30);

        let mut conn = db.pool.acquire().await.unwrap();
        let rows = api::all(&mut conn).await.unwrap();
        assert_eq!(rows.len(), 2);
        let users = rows
            .iter()
            .find(|a| a.path == "/api/v1/system/users")
            .unwrap();
        assert_eq!(users.summary, "List users");
        assert_eq!(users.tags, vec!["Users".to_string()]);
        drop(conn);

        // Second run is a no-op
        let again = refresh_apis(&db.pool, &catalog).await.unwrap();
        assert_eq!(again, ApiRefreshSummary::default());
    }

    #[tokio::test]
    async fn test_deleted_api_drops_grants() {
        let db = DbService::in_memory().await.unwrap();
        refresh_apis(&db.pool, &[]).await.unwrap();

        let grants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_apis")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(grants, 0);
    }
}
