use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use postday_core::config::{AppConfig, parse_mode};
use postday_core::post::CacheSeed;
use postday_infrastructure::{AppContext, ConfigLoader, build_context, telemetry};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "postday")]
#[command(about = "Post your day - write, browse and search short posts", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "POSTDAY_CONFIG")]
    config: Option<PathBuf>,

    /// Repository mode: local or remote
    #[arg(long, global = true)]
    mode: Option<String>,

    /// Log filter, e.g. `debug` or `postday_core=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Seed the local collection with the demo posts on first use
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, newest first
    List {
        /// Only posts in this category id
        #[arg(long, short)]
        category: Option<String>,
        /// Case-insensitive text search over title and body
        #[arg(long, short)]
        search: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a single post
    Show { id: String },
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        excerpt: String,
        #[arg(long, short)]
        category: String,
        /// Author name (local mode only)
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Update fields of an existing post
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long, short)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a post (deleting an unknown id succeeds)
    Delete { id: String },
    /// List the available categories
    Categories,
    /// Show the current session
    Whoami,
    /// Sign out of the remote identity provider
    SignOut,
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config.toml if none exists
    Init,
}

fn load_config(cli: &Cli) -> Result<(ConfigLoader, AppConfig)> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new(path.clone()),
        None => ConfigLoader::default_location()?,
    };
    let mut config = loader
        .load()
        .with_context(|| format!("failed to load {}", loader.path().display()))?;

    if let Some(mode) = &cli.mode {
        config.mode = parse_mode(mode)?;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.demo {
        config.storage.seed = CacheSeed::Demo;
    }
    Ok((loader, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (loader, config) = load_config(&cli)?;
    telemetry::init(&config.logging)?;

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init => commands::config::init(&loader),
        };
    }

    let context = build_context(config).context("failed to initialize postday")?;
    context.session.initialize().await;

    let outcome = run(cli.command, &context).await;
    for failure in context.storage_failures.take() {
        eprintln!("Warning: {}", failure);
    }
    outcome
}

async fn run(command: Commands, context: &AppContext) -> Result<()> {
    match command {
        Commands::List {
            category,
            search,
            json,
        } => commands::posts::list(context, category, search, json).await,
        Commands::Show { id } => commands::posts::show(context, &id).await,
        Commands::Create {
            title,
            excerpt,
            category,
            author,
            date,
            image_url,
        } => {
            let draft = commands::posts::draft(title, excerpt, category, author, date, image_url);
            commands::posts::create(context, draft).await
        }
        Commands::Update {
            id,
            title,
            excerpt,
            category,
            image_url,
        } => {
            let changes = commands::posts::PostChanges {
                title,
                excerpt,
                category_id: category,
                image_url,
            };
            commands::posts::update(context, &id, changes).await
        }
        Commands::Delete { id } => commands::posts::delete(context, &id).await,
        Commands::Categories => {
            commands::posts::categories(context);
            Ok(())
        }
        Commands::Whoami => {
            commands::session::whoami(context);
            Ok(())
        }
        Commands::SignOut => commands::session::sign_out(context).await,
        Commands::Config { .. } => Ok(()),
    }
}
