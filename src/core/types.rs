/*!
 * Core Types
 * Common types used across the permission engine
 */

use crate::core::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Department ID type
pub type DeptId = u32;

/// Permission rule ID type
pub type RuleId = uuid::Uuid;

/// Common result type for engine operations
pub type AclResult<T> = Result<T, super::errors::AclError>;

/// Page request with 1-based page number
///
/// Construction clamps the limit into `1..=MAX_PAGE_SIZE` and the page
/// number to at least 1, so a request is always safe to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Offset of the first item on this page
    ///
    /// Tolerates a zero page number, which deserialized requests can carry.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl<T> PageResult<T> {
    /// Apply a page request to a fully materialized result set
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.limit)
            .collect();

        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Total number of pages for this result set
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit)
    }
}
