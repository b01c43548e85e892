pub const MAX_DECIMAL_WIDTH: u8 = 18;

/// Declared content types an inscription must start with to count as a ledger operation.
pub const CONTENT_TYPE_PREFIXES: [&str; 2] = ["text/plain", "application/json"];

/// Reasons starting with this were set by an operator and are never re-evaluated when the
/// operation is invalid.
pub const PATCH_REASON_PREFIX: &str = "patch:";
