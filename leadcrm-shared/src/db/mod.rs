/// Database layer for LeadCRM
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: Embedded schema migrations
///
/// Models live in [`crate::models`].

pub mod migrations;
pub mod pool;
