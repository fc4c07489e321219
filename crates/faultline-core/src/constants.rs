/// Faultline version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Category assigned when no rule matches.
pub const DEFAULT_CATEGORY: &str = "general";

/// Module assigned when the caller supplies none.
pub const UNKNOWN_MODULE: &str = "unknown";

/// Fraction of a bounded table evicted once it overflows.
pub const EVICTION_FRACTION: f64 = 0.2;

/// Metadata key carrying the resolved category.
pub const CATEGORY_KEY: &str = "category";

/// Metadata key carrying an explicit module name.
pub const MODULE_KEY: &str = "module";

/// Metadata key set on events that matched an earlier one in the duplicate window.
pub const DUPLICATE_KEY: &str = "duplicate";

/// Active log file name.
pub const ACTIVE_LOG_FILENAME: &str = "errors.log";

/// Critical-only log file name.
pub const CRITICAL_LOG_FILENAME: &str = "critical.log";
