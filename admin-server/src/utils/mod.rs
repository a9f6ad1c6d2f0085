//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`ErrorBody`] - 统一错误与错误响应体 (from shared::error)
//! - [`logger`] - 日志初始化
//! - [`Deleted`] / [`BatchDeleted`] - 删除接口的响应体
//! - [`BatchIds`] - 批量删除的 `ids` 查询参数

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

use serde::{Deserialize, Serialize};
use shared::IdSet;

/// Body of a successful delete
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub deleted_id: i64,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self { deleted_id: id }
    }
}

/// `?ids=1,2,3` of a batch delete
///
/// Entries that are not positive integers are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchIds {
    #[serde(default)]
    pub ids: String,
}

impl BatchIds {
    pub fn to_set(&self) -> IdSet {
        self.ids
            .split(',')
            .filter_map(|raw| raw.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .collect()
    }

    /// Parsed ids, rejecting an empty batch
    pub fn require(&self) -> AppResult<IdSet> {
        let ids = self.to_set();
        if ids.is_empty() {
            return Err(AppError::invalid_field("ids", "ids must list at least one id"));
        }
        Ok(ids)
    }
}

/// Body of a successful batch delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleted {
    pub deleted_ids: Vec<i64>,
}

impl From<&IdSet> for BatchDeleted {
    fn from(ids: &IdSet) -> Self {
        Self {
            deleted_ids: ids.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_ids_skip_garbage() {
        let batch = BatchIds {
            ids: " 3, 1,abc,,-2,0,3 ".into(),
        };
        assert_eq!(batch.to_set().to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let err = BatchIds { ids: "x,0".into() }.require().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap()["field"], "ids");
    }
}
