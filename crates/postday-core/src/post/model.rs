//! Post domain model.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PostdayError, Result};

/// Date format used for locally assigned post dates.
pub const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single authored post.
///
/// `id` is assigned exactly once, at creation, and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Body text.
    pub excerpt: String,
    /// Empty means uncategorized.
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub author: String,
    /// Creation or last-modified date, already rendered for display.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Post {
    /// Re-validates the fields every stored post must carry.
    pub fn validate(&self) -> Result<()> {
        validate_required(&self.title, &self.excerpt)
    }
}

/// Input for creating a post.
///
/// `author` is only honoured in local mode; remote writes always take the
/// author from the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        excerpt: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            excerpt: excerpt.into(),
            category_id: category_id.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_required(&self.title, &self.excerpt)
    }

    /// Returns the draft date, or today's local date when omitted.
    pub fn date_or_today(&self) -> String {
        match self.date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => date.to_string(),
            _ => today(),
        }
    }

    /// Image URL with blank values normalized to `None`.
    pub fn normalized_image_url(&self) -> Option<String> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    /// Builds the stored post for a locally assigned id.
    pub fn into_post(self, id: String) -> Post {
        let date = self.date_or_today();
        let image_url = self.normalized_image_url();
        Post {
            id,
            title: self.title,
            excerpt: self.excerpt,
            category_id: self.category_id,
            author: self.author.unwrap_or_default(),
            date,
            image_url,
        }
    }
}

/// Category restriction applied when listing posts.
///
/// An empty or absent category id means "all categories".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CategoryFilter(Option<String>);

impl CategoryFilter {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn only(category_id: impl Into<String>) -> Self {
        let id = category_id.into();
        if id.is_empty() { Self(None) } else { Self(Some(id)) }
    }

    pub fn category_id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_all(&self) -> bool {
        self.0.is_none()
    }

    pub fn matches(&self, post: &Post) -> bool {
        match &self.0 {
            Some(id) => post.category_id == *id,
            None => true,
        }
    }

    /// Stable key for caches keyed by filter.
    pub fn key(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        Self::only(value)
    }
}

impl From<Option<&str>> for CategoryFilter {
    fn from(value: Option<&str>) -> Self {
        value.map(Self::only).unwrap_or_default()
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        value.map(Self::only).unwrap_or_default()
    }
}

/// Today's date in the local timezone, formatted with [`LOCAL_DATE_FORMAT`].
pub fn today() -> String {
    Local::now().date_naive().format(LOCAL_DATE_FORMAT).to_string()
}

/// Parses a locally formatted post date.
pub fn parse_local_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), LOCAL_DATE_FORMAT).ok()
}

fn validate_required(title: &str, excerpt: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(PostdayError::validation("title"));
    }
    if excerpt.trim().is_empty() {
        return Err(PostdayError::validation("excerpt"));
    }
    Ok(())
}
