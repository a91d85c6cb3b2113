use anyhow::Result;
use postday_core::category::Category;
use postday_core::error::PostdayError;
use postday_core::filter::PostFilter;
use postday_core::post::{Post, PostDraft};
use postday_infrastructure::AppContext;

/// Field changes requested by `postday update`.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
}

impl PostChanges {
    pub fn apply(self, mut post: Post) -> Post {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(category_id) = self.category_id {
            post.category_id = category_id;
        }
        if let Some(image_url) = self.image_url {
            post.image_url = Some(image_url).filter(|url| !url.trim().is_empty());
        }
        post
    }
}

pub fn draft(
    title: String,
    excerpt: String,
    category: String,
    author: Option<String>,
    date: Option<String>,
    image_url: Option<String>,
) -> PostDraft {
    PostDraft {
        title,
        excerpt,
        category_id: category,
        author,
        date,
        image_url,
    }
}

pub async fn list(
    context: &AppContext,
    category: Option<String>,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let filter = PostFilter::new()
        .with_category(category.clone())
        .with_search(search.unwrap_or_default());

    let listing = context.repository.list(category).await;
    if let Some(err) = &listing.error {
        eprintln!("Warning: showing last known posts ({})", err);
    }
    let posts = filter.apply(&listing.posts);

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else {
        print!("{}", render_table(&posts, context.repository.categories()));
    }
    Ok(())
}

pub async fn show(context: &AppContext, id: &str) -> Result<()> {
    let post = context
        .repository
        .get(id)
        .await?
        .ok_or_else(|| PostdayError::not_found("post", id))?;
    print!("{}", render_post(&post, context.repository.categories()));
    Ok(())
}

pub async fn create(context: &AppContext, draft: PostDraft) -> Result<()> {
    let post = context.repository.create(draft).await.map_err(explain)?;
    println!("Created post {}", post.id);
    Ok(())
}

pub async fn update(context: &AppContext, id: &str, changes: PostChanges) -> Result<()> {
    let current = context
        .repository
        .get(id)
        .await?
        .ok_or_else(|| PostdayError::not_found("post", id))?;
    context
        .repository
        .update(changes.apply(current))
        .await
        .map_err(explain)?;
    println!("Updated post {}", id);
    Ok(())
}

pub async fn delete(context: &AppContext, id: &str) -> Result<()> {
    context.repository.delete(id).await.map_err(explain)?;
    println!("Deleted post {}", id);
    Ok(())
}

pub fn categories(context: &AppContext) {
    for category in context.repository.categories() {
        println!("{:>3}  {:<10} {}", category.id, category.name, category.color);
    }
}

fn explain(err: PostdayError) -> anyhow::Error {
    match &err {
        PostdayError::AuthRequired => {
            anyhow::Error::new(err)
                .context("sign in first: set POSTDAY_ACCESS_TOKEN or remote.access_token")
        }
        _ => anyhow::Error::new(err),
    }
}

fn category_name<'a>(categories: &'a [Category], id: &str) -> &'a str {
    Category::find(categories, id)
        .map(|category| category.name.as_str())
        .unwrap_or("-")
}

pub fn render_table(posts: &[Post], categories: &[Category]) -> String {
    if posts.is_empty() {
        return "No posts found.\n".to_string();
    }

    let mut out = String::new();
    for post in posts {
        out.push_str(&format!(
            "{:<38} {:<10} {:<10} {}\n",
            post.id,
            post.date,
            category_name(categories, &post.category_id),
            post.title
        ));
    }
    out
}

pub fn render_post(post: &Post, categories: &[Category]) -> String {
    let mut out = format!(
        "{}\n{} | {} | {}\n\n{}\n",
        post.title,
        post.date,
        category_name(categories, &post.category_id),
        if post.author.is_empty() { "anonymous" } else { post.author.as_str() },
        post.excerpt
    );
    if let Some(url) = post.image_url.as_deref().filter(|url| !url.is_empty()) {
        out.push_str(&format!("\nImage: {}\n", url));
    }
    out
}
