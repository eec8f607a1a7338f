/// Database models for LeadCRM
///
/// Each model owns its SQL. Reads that must respect a principal's
/// visibility take the filters from [`crate::access::scope`].
///
/// # Models
///
/// - `user`: Accounts backing organisors and agents
/// - `organisation`: Tenant root, one per organisor
/// - `agent`: Agent records joined with their account profile
/// - `lead`: Sales prospects
/// - `category`: Pipeline stages
///
/// # Example
///
/// ```no_run
/// use leadcrm_shared::db::pool::{create_pool, DatabaseConfig};
/// use leadcrm_shared::models::category::Category;
/// use uuid::Uuid;
///
/// # async fn example(organisation_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for category in Category::list(&pool, organisation_id).await? {
///     println!("{}", category.name);
/// }
/// # Ok(())
/// # }
/// ```

pub mod agent;
pub mod category;
pub mod lead;
pub mod organisation;
pub mod user;
