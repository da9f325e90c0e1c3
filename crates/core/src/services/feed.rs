//! Feed service.

use std::collections::BTreeSet;

use ripple_common::AppResult;
use ripple_db::{
    entities::post,
    repositories::{BlockingRepository, PostRepository},
};

/// One page of the home feed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FeedPage {
    /// Posts on this page, newest first.
    pub posts: Vec<post::Model>,
    /// The requested page number (1-based).
    pub current_page: u64,
    /// Total number of pages for the viewer's filtered feed.
    pub total_pages: u64,
    /// Total number of posts visible to the viewer.
    pub total_posts: u64,
}

/// Feed service for business logic.
///
/// The feed hides posts from authors the viewer blocks and from authors who
/// block the viewer. The exclusion set is recomputed on every request, so a
/// new block takes effect on the next page load.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    blocking_repo: BlockingRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, blocking_repo: BlockingRepository) -> Self {
        Self {
            post_repo,
            blocking_repo,
        }
    }

    /// Fetch one page of posts visible to the viewer.
    ///
    /// The page contents and the totals are computed against the same
    /// exclusion set, so `total_posts` always counts exactly the posts the
    /// viewer could page through.
    pub async fn visible_posts(
        &self,
        viewer_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<FeedPage> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let blocked = self.blocking_repo.blocked_ids(viewer_id).await?;
        let blockers = self.blocking_repo.blocker_ids_of(viewer_id).await?;
        let excluded = Self::merge_excluded(blocked, blockers);

        let total_posts = self.post_repo.count_visible(&excluded).await?;
        let total_pages = total_posts.div_ceil(page_size);

        // Page comes straight from the client; keep the offset arithmetic
        // from wrapping on absurd page numbers.
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let posts = self
            .post_repo
            .find_visible(&excluded, page_size, offset)
            .await?;

        Ok(FeedPage {
            posts,
            current_page: page,
            total_pages,
            total_posts,
        })
    }

    /// Union of both block directions, deduplicated.
    fn merge_excluded(blocked: Vec<String>, blockers: Vec<String>) -> Vec<String> {
        let set: BTreeSet<String> = blocked.into_iter().chain(blockers).collect();
        set.into_iter().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            text: "Hello".to_string(),
            media: serde_json::json!([]),
            created_at: Utc::now().into(),
            updated_at: Some(Utc::now().into()),
        }
    }

    #[test]
    fn test_merge_excluded_deduplicates_both_directions() {
        let merged = FeedService::merge_excluded(
            vec!["user2".to_string(), "user3".to_string()],
            vec!["user3".to_string(), "user4".to_string()],
        );
        assert_eq!(
            merged,
            vec![
                "user2".to_string(),
                "user3".to_string(),
                "user4".to_string()
            ]
        );
    }

    #[test]
    fn test_merge_excluded_empty() {
        assert!(FeedService::merge_excluded(Vec::new(), Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_visible_posts_totals_and_page() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(5))
                }]])
                .append_query_results([[
                    create_test_post("post5", "user2"),
                    create_test_post("post4", "user3"),
                ]])
                .into_connection(),
        );
        let blocking_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                ])
                .into_connection(),
        );

        let service = FeedService::new(
            PostRepository::new(post_db),
            BlockingRepository::new(blocking_db),
        );
        let feed = service.visible_posts("user1", 1, 2).await.unwrap();

        assert_eq!(feed.total_posts, 5);
        assert_eq!(feed.total_pages, 3);
        assert_eq!(feed.current_page, 1);
        assert_eq!(feed.posts.len(), 2);
    }

    #[tokio::test]
    async fn test_visible_posts_huge_page_number_does_not_overflow() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(5))
                }]])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let blocking_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                ])
                .into_connection(),
        );

        let service = FeedService::new(
            PostRepository::new(post_db),
            BlockingRepository::new(blocking_db),
        );
        let feed = service.visible_posts("user1", u64::MAX, 100).await.unwrap();

        assert_eq!(feed.current_page, u64::MAX);
        assert!(feed.posts.is_empty());
    }

    #[tokio::test]
    async fn test_visible_posts_empty_feed_has_zero_pages() {
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let blocking_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                    Vec::<ripple_db::entities::blocking::Model>::new(),
                ])
                .into_connection(),
        );

        let service = FeedService::new(
            PostRepository::new(post_db),
            BlockingRepository::new(blocking_db),
        );
        let feed = service.visible_posts("user1", 1, 20).await.unwrap();

        assert_eq!(feed.total_pages, 0);
        assert!(feed.posts.is_empty());
    }
}
