/// Category views

use std::collections::HashMap;

use uuid::Uuid;

use super::CrmService;
use crate::access::{CategoryFilter, LeadFilter};
use crate::error::{CrmError, CrmResult};
use crate::identity::Principal;
use crate::models::category::{Category, CategoryDetail, CategoryListing, CategorySummary};

impl CrmService {
    /// Categories of the principal's organisation with organisation-wide
    /// lead counts
    pub async fn list_categories(&self, principal: &Principal) -> CrmResult<CategoryListing> {
        let filter = CategoryFilter::for_principal(principal);

        let categories = self.store.list_categories(&filter).await?;
        let counts = self
            .store
            .lead_counts_by_category(filter.organisation_id)
            .await?;

        Ok(summarise(categories, &counts))
    }

    /// Category plus the leads in it that the principal may see
    pub async fn get_category(&self, principal: &Principal, id: Uuid) -> CrmResult<CategoryDetail> {
        let category = self
            .store
            .find_category(&CategoryFilter::for_principal(principal), id)
            .await?
            .ok_or_else(|| CrmError::not_found("Category", id))?;

        let leads = self
            .store
            .list_leads(&LeadFilter::for_principal(principal).in_category(category.id))
            .await?;

        Ok(CategoryDetail { category, leads })
    }
}

/// Joins categories with per-category lead counts
///
/// Counts for categories not in `categories` are ignored; the `None`
/// bucket becomes `uncategorised_lead_count`.
pub fn summarise(categories: Vec<Category>, counts: &[(Option<Uuid>, i64)]) -> CategoryListing {
    let counts: HashMap<Option<Uuid>, i64> = counts.iter().copied().collect();

    let categories = categories
        .into_iter()
        .map(|category| CategorySummary {
            lead_count: counts.get(&Some(category.id)).copied().unwrap_or(0),
            category,
        })
        .collect();

    CategoryListing {
        categories,
        uncategorised_lead_count: counts.get(&None).copied().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            organisation_id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarise_counts() {
        let new = category("New");
        let contacted = category("Contacted");
        let counts = vec![(Some(new.id), 3), (None, 2), (Some(Uuid::new_v4()), 9)];

        let listing = summarise(vec![contacted.clone(), new.clone()], &counts);

        assert_eq!(listing.uncategorised_lead_count, 2);
        assert_eq!(listing.categories[0].category, contacted);
        assert_eq!(listing.categories[0].lead_count, 0);
        assert_eq!(listing.categories[1].lead_count, 3);
    }

    #[test]
    fn test_summarise_empty() {
        let listing = summarise(vec![], &[]);
        assert!(listing.categories.is_empty());
        assert_eq!(listing.uncategorised_lead_count, 0);
    }
}
