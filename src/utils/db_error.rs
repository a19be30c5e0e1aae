/// Name of the primary key constraint on the `urls` table.
pub const URLS_PRIMARY_KEY: &str = "urls_pkey";

/// Returns true if `e` is a unique violation on the short code column.
///
/// Other unique violations (there are none today) are not treated as a code
/// collision.
pub fn is_unique_violation_on_id(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(URLS_PRIMARY_KEY))
}
