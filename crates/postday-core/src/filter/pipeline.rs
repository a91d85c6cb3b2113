use crate::post::{CategoryFilter, Post};

/// Category and free-text search restrictions over a post collection.
///
/// Both stages are independent predicates, so their order does not matter
/// and the result always preserves input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    category: CategoryFilter,
    /// Lowercased query. Empty means no search restriction.
    query: String,
}

impl PostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_search(mut self, query: impl AsRef<str>) -> Self {
        self.query = query.as_ref().to_lowercase();
        self
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn search_query(&self) -> &str {
        &self.query
    }

    /// True when neither stage restricts anything.
    pub fn is_identity(&self) -> bool {
        self.category.is_all() && self.query.is_empty()
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.category.matches(post) && matches_search(post, &self.query)
    }

    /// Filters `posts`, preserving their relative order.
    pub fn apply(&self, posts: &[Post]) -> Vec<Post> {
        posts
            .iter()
            .filter(|post| self.matches(post))
            .cloned()
            .collect()
    }
}

/// Applies a category restriction and a search query in one pass.
///
/// `None` and `Some("")` are equivalent for both arguments.
pub fn apply(posts: &[Post], category_id: Option<&str>, search_query: Option<&str>) -> Vec<Post> {
    PostFilter::new()
        .with_category(category_id)
        .with_search(search_query.unwrap_or_default())
        .apply(posts)
}

/// `query` must already be lowercased.
fn matches_search(post: &Post, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(query) || post.excerpt.to_lowercase().contains(query)
}
