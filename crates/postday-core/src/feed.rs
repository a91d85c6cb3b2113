//! Caller-side view state for the active post filter.
//!
//! Concurrent listings may resolve out of order. A [`PostFeed`] hands out a
//! [`FeedTicket`] per request and only accepts the listing whose ticket is
//! still the active one, so a slow response for an old filter can never
//! overwrite the state of a newer request.

use crate::error::PostdayError;
use crate::post::{CategoryFilter, Post, PostListing};

/// Identifies one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTicket {
    sequence: u64,
    filter: CategoryFilter,
}

impl FeedTicket {
    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }
}

/// Display state for the active filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedState {
    #[default]
    Idle,
    Pending,
    Ready(Vec<Post>),
    Failed {
        error: PostdayError,
        fallback: Vec<Post>,
    },
}

#[derive(Debug, Default)]
pub struct PostFeed {
    issued: u64,
    active: Option<FeedTicket>,
    state: FeedState,
}

impl PostFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request for `filter`, superseding any pending one.
    pub fn request(&mut self, filter: impl Into<CategoryFilter>) -> FeedTicket {
        self.issued += 1;
        let ticket = FeedTicket {
            sequence: self.issued,
            filter: filter.into(),
        };
        self.active = Some(ticket.clone());
        self.state = FeedState::Pending;
        ticket
    }

    /// Applies a listing if `ticket` is still the active request.
    ///
    /// # Returns
    ///
    /// `false` when the response was stale and discarded.
    pub fn resolve(&mut self, ticket: &FeedTicket, listing: PostListing) -> bool {
        if self.active.as_ref() != Some(ticket) {
            tracing::debug!(
                filter = ticket.filter.key(),
                "discarding stale listing response"
            );
            return false;
        }

        self.state = match listing.error {
            None => FeedState::Ready(listing.posts),
            Some(error) => FeedState::Failed {
                error,
                fallback: listing.posts,
            },
        };
        true
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn active_filter(&self) -> Option<&CategoryFilter> {
        self.active.as_ref().map(FeedTicket::filter)
    }

    /// Posts to display right now: ready posts or the failure fallback.
    pub fn visible_posts(&self) -> &[Post] {
        match &self.state {
            FeedState::Ready(posts) => posts,
            FeedState::Failed { fallback, .. } => fallback,
            FeedState::Idle | FeedState::Pending => &[],
        }
    }
}
