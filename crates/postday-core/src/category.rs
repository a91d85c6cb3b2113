//! Category reference data.
//!
//! Categories are static for the lifetime of the process. The default set
//! mirrors the five categories offered by the post form.

use serde::{Deserialize, Serialize};

/// A post category with a display colour token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Colour token used by the presentation layer for the category badge.
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// The five categories of the default configuration.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new("1", "Personal", "blue"),
            Category::new("2", "Work", "green"),
            Category::new("3", "Travel", "yellow"),
            Category::new("4", "Food", "red"),
            Category::new("5", "Health", "purple"),
        ]
    }

    /// Finds a category by id within `categories`.
    pub fn find<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
        categories.iter().find(|category| category.id == id)
    }
}
