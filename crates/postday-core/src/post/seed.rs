//! First-use seed data for the local post collection.

use serde::{Deserialize, Serialize};

use super::model::Post;

/// Which collection the cache materializes the first time `"posts"` is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSeed {
    /// Start with an empty collection.
    #[default]
    Empty,
    /// Start with the fixed demo collection from [`demo_posts`].
    Demo,
}

impl CacheSeed {
    pub fn posts(self) -> Vec<Post> {
        match self {
            CacheSeed::Empty => Vec::new(),
            CacheSeed::Demo => demo_posts(),
        }
    }
}

/// The demo collection, newest first.
pub fn demo_posts() -> Vec<Post> {
    vec![
        demo(
            "1",
            "Delicious Mediterranean Cuisine",
            "Explore the flavors of the Mediterranean with these authentic recipes.",
            "4",
            "2024-02-20",
            "Chef Maria",
            "https://images.unsplash.com/photo-1618160702438-9b02ab6515c9",
        ),
        demo(
            "2",
            "Meet Luna: The Playful Kitten",
            "A heartwarming story about a rescued kitten finding her forever home.",
            "1",
            "2024-02-19",
            "Pet Lover Sarah",
            "https://images.unsplash.com/photo-1535268647677-300dbf3d78d1",
        ),
        demo(
            "3",
            "Dragons of Komodo Island",
            "A fascinating look at these ancient reptiles in their natural habitat.",
            "3",
            "2024-02-18",
            "Wildlife Explorer John",
            "https://images.unsplash.com/photo-1487252665478-49b61b47f302",
        ),
        demo(
            "4",
            "Desert Wanderers: Life of Camels",
            "Discover how these magnificent creatures survive in harsh desert conditions.",
            "3",
            "2024-02-17",
            "Desert Guide Ahmed",
            "https://images.unsplash.com/photo-1469041797191-50ace28483c3",
        ),
        demo(
            "5",
            "Monkey Business",
            "A day in the life of playful primates in their natural habitat.",
            "5",
            "2024-02-16",
            "Nature Photographer Lisa",
            "https://images.unsplash.com/photo-1501286353178-1ec881214838",
        ),
    ]
}

fn demo(
    id: &str,
    title: &str,
    excerpt: &str,
    category_id: &str,
    date: &str,
    author: &str,
    image_url: &str,
) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        category_id: category_id.to_string(),
        author: author.to_string(),
        date: date.to_string(),
        image_url: Some(image_url.to_string()),
    }
}
