/// Taxonomy reconciler
///
/// Articles reference categories and tags by name. Resolution is an
/// optimistic find-or-create:
///
/// 1. look for a row whose name or slug equals the given name exactly
/// 2. reuse it when found
/// 3. otherwise insert `{name, slug}` with both set to the given name
/// 4. if that insert hits a unique constraint, another writer won the race,
///    so look it up again
///
/// Step 4 is retried a bounded number of times. Running out of attempts means
/// the row keeps vanishing between insert and lookup, which is reported as an
/// internal error.

use tracing::{debug, warn};

use super::ContentError;
use crate::models::category::{Category, NewCategory};
use crate::models::tag::{NewTag, Tag};
use crate::store::{StoreError, TaxonomyStore};

/// Lookup/insert rounds before giving up
const MAX_ATTEMPTS: usize = 3;

/// Resolves a category name to an existing or newly created category
pub async fn resolve_category<S>(store: &S, name: &str) -> Result<Category, ContentError>
where
    S: TaxonomyStore + ?Sized,
{
    let name = require_name(name, "Category")?;

    for attempt in 1..=MAX_ATTEMPTS {
        if let Some(existing) = store.find_category_by_name_or_slug(name).await? {
            return Ok(existing);
        }

        let created = store
            .create_category(NewCategory {
                name: name.to_string(),
                slug: name.to_string(),
                description: String::new(),
            })
            .await;

        match created {
            Ok(category) => {
                debug!(category_id = category.id, name = %category.name, "Category created");
                return Ok(category);
            }
            Err(StoreError::UniqueViolation(constraint)) => {
                debug!(name = %name, constraint = %constraint, attempt, "Category insert raced, retrying lookup");
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!(name = %name, "Category could not be resolved");
    Err(ContentError::Internal(format!(
        "category '{}' could not be resolved",
        name
    )))
}

/// Resolves a single tag name
pub async fn resolve_tag<S>(store: &S, name: &str) -> Result<Tag, ContentError>
where
    S: TaxonomyStore + ?Sized,
{
    let name = require_name(name, "Tag")?;

    for attempt in 1..=MAX_ATTEMPTS {
        if let Some(existing) = store.find_tag_by_name_or_slug(name).await? {
            return Ok(existing);
        }

        let created = store
            .create_tag(NewTag {
                name: name.to_string(),
                slug: name.to_string(),
            })
            .await;

        match created {
            Ok(tag) => {
                debug!(tag_id = tag.id, name = %tag.name, "Tag created");
                return Ok(tag);
            }
            Err(StoreError::UniqueViolation(constraint)) => {
                debug!(name = %name, constraint = %constraint, attempt, "Tag insert raced, retrying lookup");
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!(name = %name, "Tag could not be resolved");
    Err(ContentError::Internal(format!("tag '{}' could not be resolved", name)))
}

/// Resolves a list of tag names, in order, without duplicates
///
/// The first occurrence of a repeated name wins. Every name is validated
/// before anything is written.
pub async fn resolve_tags<S>(store: &S, names: &[String]) -> Result<Vec<Tag>, ContentError>
where
    S: TaxonomyStore + ?Sized,
{
    let unique = dedup_names(names);
    for name in &unique {
        require_name(name, "Tag")?;
    }

    let mut tags = Vec::with_capacity(unique.len());
    for name in unique {
        tags.push(resolve_tag(store, name).await?);
    }
    Ok(tags)
}

/// Order-preserving de-duplication
pub fn dedup_names(names: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

fn require_name<'a>(name: &'a str, kind: &str) -> Result<&'a str, ContentError> {
    if name.trim().is_empty() {
        return Err(ContentError::Invalid(format!("{} name cannot be empty", kind)));
    }
    Ok(name)
}
