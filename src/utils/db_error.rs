//! Classification of `sqlx` errors into persistence port failures.

use crate::domain::repositories::StoreError;

/// Primary key constraint on `links.code`.
const LINKS_CODE_CONSTRAINT: &str = "links_pkey";

/// Returns true if `e` is a unique violation on the short code.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(LINKS_CODE_CONSTRAINT))
}

/// Maps any other `sqlx` failure to [`StoreError::Unavailable`].
pub fn unavailable(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}
