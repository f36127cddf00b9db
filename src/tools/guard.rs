//! Statement guard shared by the SQL-accepting tools.
//!
//! A statement is admitted when its leading keyword matches the tool's
//! category. Payloads carrying more than one statement are admitted as
//! well, but logged at `warn` since only the first keyword was checked.

use crate::error::{DbError, DbResult};
use crate::models::DatabaseType;
use crate::tools::classifier::{StatementCategory, classify, statement_count};
use tracing::{debug, warn};

/// Admit `sql` for a tool accepting `category`, or reject it with
/// `DisallowedStatement`.
pub fn ensure_category(
    tool: &'static str,
    sql: &str,
    category: StatementCategory,
    db_type: DatabaseType,
) -> DbResult<()> {
    if !classify(sql, category) {
        debug!(tool, category = ?category, "Statement rejected");
        return Err(DbError::disallowed(category.rejection_message()));
    }

    if let Some(count) = statement_count(sql, db_type) {
        if count > 1 {
            warn!(
                tool,
                statements = count,
                "Payload contains multiple statements; only the first was classified"
            );
        }
    }

    Ok(())
}
