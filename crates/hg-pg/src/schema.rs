/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` to enable compile-time string
/// construction via `const_format::concatcp!`.
///
/// This trait contains no I/O operations; it purely describes table
/// structure. Statements are executed through [`migrate`](crate::migrate).
pub trait Schema {
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}
