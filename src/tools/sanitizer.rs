//! Quote escaping for values interpolated into generated SQL.

/// Escape single quotes by doubling them.
///
/// Not idempotent: apply once to the raw value.
pub fn sanitize(input: &str) -> String {
    input.replace('\'', "''")
}
