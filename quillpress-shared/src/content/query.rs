/// Article query engine
///
/// Turns raw listing parameters into a filtered, paginated page of article
/// summaries, and loads the full detail view of a single article.
///
/// Visibility depends on the caller: anonymous readers only ever see
/// published articles, signed-in readers see drafts too. Soft-deleted
/// articles are never visible.
///
/// # Example
///
/// ```
/// use quillpress_shared::content::query::{ListParams, PagingConfig};
///
/// let params = ListParams {
///     page: Some("0".to_string()),
///     page_size: Some("500".to_string()),
///     ..Default::default()
/// };
/// let request = params.normalize(&PagingConfig::default(), false);
/// assert_eq!(request.page, 1);
/// assert_eq!(request.page_size, 100);
/// assert!(request.filter.published_only);
/// ```

use serde::{Deserialize, Serialize};

use super::ContentError;
use crate::auth::middleware::AuthContext;
use crate::models::article::{Article, ArticleFilter, ArticleSummary};
use crate::store::ContentStore;

/// Page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Raw listing parameters as they arrive in the query string
///
/// Numbers are kept as strings so that garbage degrades to the defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// Normalized listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub page: i64,
    pub page_size: i64,
    pub filter: ArticleFilter,
}

impl ListRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl ListParams {
    /// Applies defaults, clamps paging and drops empty filters
    pub fn normalize(&self, paging: &PagingConfig, is_authenticated: bool) -> ListRequest {
        // Keep the offset of the largest allowed page representable
        let last_page = i64::MAX / paging.max_page_size.max(1);
        let page = parse_number(self.page.as_deref())
            .unwrap_or(1)
            .clamp(1, last_page);

        let page_size = match parse_number(self.page_size.as_deref()) {
            Some(size) if size >= 1 => size.min(paging.max_page_size),
            _ => paging.default_page_size,
        };

        ListRequest {
            page,
            page_size,
            filter: ArticleFilter {
                published_only: !is_authenticated,
                category: non_empty(&self.category),
                tag: non_empty(&self.tag),
                search: non_empty(&self.search),
            },
        }
    }
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Pointer to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: i64,
    pub page_size: i64,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total rows matching the filters, across all pages
    pub count: i64,
    pub next: Option<PageLink>,
    pub prev: Option<PageLink>,
    pub result: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: &ListRequest, total: i64, result: Vec<T>) -> Self {
        let has_next = request.offset().saturating_add(request.page_size) < total;
        let has_prev = request.page > 1;

        Self {
            count: total,
            next: has_next.then_some(PageLink {
                page: request.page.saturating_add(1),
                page_size: request.page_size,
            }),
            prev: has_prev.then_some(PageLink {
                page: request.page - 1,
                page_size: request.page_size,
            }),
            result,
        }
    }
}

/// Public view of an article's author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Full article view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Lists article summaries for the caller
pub async fn list_articles<S>(
    store: &S,
    auth: &AuthContext,
    params: &ListParams,
    paging: &PagingConfig,
) -> Result<Page<ArticleSummary>, ContentError>
where
    S: ContentStore + ?Sized,
{
    let request = params.normalize(paging, auth.is_authenticated);

    let total = store.count_articles(&request.filter).await?;
    let rows = store
        .list_articles(&request.filter, request.page_size, request.offset())
        .await?;

    tracing::debug!(
        page = request.page,
        page_size = request.page_size,
        total,
        returned = rows.len(),
        "Listed articles"
    );

    Ok(Page::new(&request, total, rows))
}

/// Loads one article by slug, hiding drafts from anonymous callers
pub async fn get_article<S>(
    store: &S,
    auth: &AuthContext,
    slug: &str,
) -> Result<ArticleDetail, ContentError>
where
    S: ContentStore + ?Sized,
{
    let article = store
        .find_article_by_slug(slug, !auth.is_authenticated)
        .await?
        .ok_or_else(|| ContentError::NotFound("Article".to_string()))?;

    load_detail(store, article).await
}

/// Expands an article row into its detail view
pub async fn load_detail<S>(store: &S, article: Article) -> Result<ArticleDetail, ContentError>
where
    S: ContentStore + ?Sized,
{
    let author = match article.author_id {
        Some(id) => store.find_user_by_id(id).await?.map(|u| AuthorView {
            id: u.id,
            username: u.username,
            email: u.email,
        }),
        None => None,
    };

    let category = match article.category_id {
        Some(id) => store.find_category_by_id(id).await?.map(|c| c.name),
        None => None,
    };

    let tags = store
        .article_tags(article.id)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    Ok(ArticleDetail {
        id: article.id,
        title: article.title,
        slug: article.slug,
        content: article.content,
        excerpt: article.excerpt,
        published: article.published,
        created_at: article.created_at,
        updated_at: article.updated_at,
        author,
        category,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::NewArticle;
    use crate::store::memory::MemoryStore;
    use crate::store::ArticleStore;

    fn params(page: &str, page_size: &str) -> ListParams {
        ListParams {
            page: Some(page.to_string()),
            page_size: Some(page_size.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_page_size_clamping() {
        let paging = PagingConfig::default();

        assert_eq!(params("1", "1000").normalize(&paging, true).page_size, 100);
        assert_eq!(params("1", "0").normalize(&paging, true).page_size, 10);
        assert_eq!(params("1", "-5").normalize(&paging, true).page_size, 10);
        assert_eq!(params("1", "abc").normalize(&paging, true).page_size, 10);
        assert_eq!(params("1", "25").normalize(&paging, true).page_size, 25);
        assert_eq!(ListParams::default().normalize(&paging, true).page_size, 10);
    }

    #[test]
    fn test_page_floor() {
        let paging = PagingConfig::default();

        assert_eq!(params("0", "10").normalize(&paging, true).page, 1);
        assert_eq!(params("-3", "10").normalize(&paging, true).page, 1);
        assert_eq!(params("x", "10").normalize(&paging, true).page, 1);
        assert_eq!(params("4", "10").normalize(&paging, true).offset(), 30);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let paging = PagingConfig::default();

        for raw in ["100000000000000000", "9223372036854775807"] {
            let request = params(raw, "100").normalize(&paging, true);
            assert!(request.page <= i64::MAX / paging.max_page_size);
            assert!(request.offset() > 0);

            let page: Page<()> = Page::new(&request, 3, vec![]);
            assert_eq!(page.count, 3);
            assert!(page.next.is_none());
            assert_eq!(page.prev.map(|p| p.page), Some(request.page - 1));
        }
    }

    #[test]
    fn test_empty_filters_are_absent() {
        let request = ListParams {
            category: Some(String::new()),
            tag: Some(String::new()),
            search: Some("rust".to_string()),
            ..Default::default()
        }
        .normalize(&PagingConfig::default(), false);

        assert_eq!(request.filter.category, None);
        assert_eq!(request.filter.tag, None);
        assert_eq!(request.filter.search.as_deref(), Some("rust"));
        assert!(request.filter.published_only);
    }

    #[test]
    fn test_page_links() {
        let request = params("2", "10").normalize(&PagingConfig::default(), true);

        let page: Page<()> = Page::new(&request, 25, vec![]);
        assert_eq!(page.next, Some(PageLink { page: 3, page_size: 10 }));
        assert_eq!(page.prev, Some(PageLink { page: 1, page_size: 10 }));

        let page: Page<()> = Page::new(&request, 20, vec![]);
        assert_eq!(page.next, None);

        let json = serde_json::to_value(&page).unwrap();
        assert!(json["next"].is_null());
        assert_eq!(json["count"], 20);
    }

    async fn seed(store: &MemoryStore, slug: &str, published: bool) {
        store
            .create_article(NewArticle {
                title: slug.to_string(),
                slug: slug.to_string(),
                content: "body".to_string(),
                excerpt: None,
                published,
                author_id: None,
                category_id: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_anonymous_listing_hides_drafts() {
        let store = MemoryStore::new();
        seed(&store, "live", true).await;
        seed(&store, "draft", false).await;

        let paging = PagingConfig::default();
        let anonymous = list_articles(&store, &AuthContext::anonymous(), &ListParams::default(), &paging)
            .await
            .unwrap();
        assert_eq!(anonymous.count, 1);
        assert!(anonymous.result.iter().all(|a| a.published));

        let signed_in = list_articles(
            &store,
            &AuthContext::authenticated(1),
            &ListParams::default(),
            &paging,
        )
        .await
        .unwrap();
        assert_eq!(signed_in.count, 2);
    }

    #[tokio::test]
    async fn test_draft_detail_is_not_found_for_anonymous() {
        let store = MemoryStore::new();
        seed(&store, "draft", false).await;

        let err = get_article(&store, &AuthContext::anonymous(), "draft")
            .await
            .unwrap_err();
        assert_eq!(err, ContentError::NotFound("Article".to_string()));

        let detail = get_article(&store, &AuthContext::authenticated(9), "draft")
            .await
            .unwrap();
        assert_eq!(detail.slug, "draft");
        assert!(detail.author.is_none());
        assert!(detail.tags.is_empty());
    }

    #[tokio::test]
    async fn test_total_counts_filtered_rows() {
        let store = MemoryStore::new();
        for i in 0..7 {
            seed(&store, &format!("post-{}", i), true).await;
        }

        let page = list_articles(
            &store,
            &AuthContext::anonymous(),
            &params("3", "3"),
            &PagingConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(page.count, 7);
        assert_eq!(page.result.len(), 1);
        assert!(page.next.is_none());
        assert_eq!(page.prev.map(|p| p.page), Some(2));
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let store = MemoryStore::new();
        seed(&store, "only", true).await;

        let page = list_articles(
            &store,
            &AuthContext::anonymous(),
            &params("100000000000000000", "100"),
            &PagingConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(page.count, 1);
        assert!(page.result.is_empty());
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        for slug in ["first", "second", "third"] {
            seed(&store, slug, true).await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let page = list_articles(
            &store,
            &AuthContext::anonymous(),
            &ListParams::default(),
            &PagingConfig::default(),
        )
        .await
        .unwrap();

        let slugs: Vec<&str> = page.result.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["third", "second", "first"]);
    }
}
