/*!
 * Engine Limits and Constants
 *
 * Centralized location for all engine-wide limits and thresholds.
 */

/// Default page size for resolution results
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on caller-supplied page sizes
/// Resolution materializes the full effective set before paginating,
/// so this only bounds the response payload, not the work done
pub const MAX_PAGE_SIZE: usize = 100;

/// Maximum items accepted by a single batch mutation
/// Batches are best-effort and per-item audited; the cap keeps the
/// partial-failure surface of one call inspectable
pub const MAX_BATCH_ITEMS: usize = 1_000;

/// Global audit ring buffer capacity
pub const MAX_AUDIT_ENTRIES: usize = 10_000;

/// Per-department audit ring buffer capacity
pub const MAX_DEPT_AUDIT_ENTRIES: usize = 1_000;
