use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    Confirmation, ConfirmationPrompt, DishDetailController, GestureSample, QueuedStore, Store,
};
use shared::domain::DishId;
use storage::{Storage, StoreBackend};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;
mod host;

use catalog::Catalog;
use config::{load_settings, normalize_database_url, Settings};
use host::{ConsoleHost, FixedAnswer, StdinPrompt};

#[derive(Parser, Debug)]
struct Cli {
    /// Path to a TOML config file (defaults to ./menu.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    /// Answer every confirmation prompt with OK.
    #[arg(long, conflicts_with = "no")]
    yes: bool,
    /// Answer every confirmation prompt with Cancel.
    #[arg(long)]
    no: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the dish catalog (and its comments) into the store.
    Seed {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    Dishes,
    Show {
        dish: i64,
    },
    /// Replay one drag session over the dish card.
    Drag {
        dish: i64,
        /// Horizontal displacement samples, in order; the last one decides.
        #[arg(long = "dx", allow_negative_numbers = true, required = true)]
        samples: Vec<f64>,
        /// Fill and submit the comment form if the drag opens it.
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long, default_value_t = 3)]
        rating: u8,
    },
    Favorite {
        dish: i64,
    },
    Comment {
        dish: i64,
        #[arg(long, default_value_t = 3)]
        rating: u8,
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        text: String,
        /// Open and fill the form, then cancel instead of submitting.
        #[arg(long)]
        cancel: bool,
    },
    Share {
        dish: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(database_url) = &cli.database_url {
        settings.database_url = database_url.clone();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    storage.health_check().await?;

    let backend: Arc<dyn StoreBackend> = Arc::new(storage.clone());
    let store = Arc::new(QueuedStore::spawn(backend));
    let prompt: Arc<dyn ConfirmationPrompt> = if cli.yes {
        Arc::new(FixedAnswer(Confirmation::Affirmed))
    } else if cli.no {
        Arc::new(FixedAnswer(Confirmation::Declined))
    } else {
        Arc::new(StdinPrompt)
    };

    let result = run(cli.command, &storage, Arc::clone(&store), prompt, &settings).await;
    match Arc::try_unwrap(store) {
        Ok(store) => store.shutdown().await?,
        Err(store) => store.flush().await?,
    }
    result
}

async fn run(
    command: Command,
    storage: &Storage,
    store: Arc<QueuedStore>,
    prompt: Arc<dyn ConfirmationPrompt>,
    settings: &Settings,
) -> Result<()> {
    let base_url = settings.base_url.as_str();
    let open = |dish: i64| {
        let store: Arc<dyn Store> = store.clone();
        let prompt = Arc::clone(&prompt);
        async move {
            DishDetailController::load(DishId(dish), store, prompt, Arc::new(ConsoleHost))
                .await
                .map(|controller| controller.with_base_url(base_url))
        }
    };

    match command {
        Command::Seed { catalog } => {
            let catalog = match catalog.as_deref().or(settings.catalog_path.as_deref()) {
                Some(path) => Catalog::from_path(path)?,
                None => Catalog::bundled()?,
            };
            catalog.seed(storage).await?;
            println!("seeded {} dishes", catalog.dishes.len());
        }
        Command::Dishes => {
            for dish in store.dishes().await? {
                println!("{:>3}  {}", dish.id.0, dish.name);
            }
        }
        Command::Show { dish } => {
            let controller = open(dish).await?;
            print_detail(&controller).await?;
        }
        Command::Drag {
            dish,
            samples,
            author,
            text,
            rating,
        } => {
            let mut controller = open(dish).await?;
            controller.begin_gesture()?;
            for dx in samples {
                controller.record_sample(GestureSample::horizontal(dx))?;
            }
            let outcome = controller.end_gesture().await?;
            println!("{outcome:?}");
            if controller.form().is_open() {
                match author {
                    Some(author) => {
                        fill_form(&mut controller, rating, author, text)?;
                        controller.submit_comment()?;
                        println!("comment submitted");
                    }
                    None => {
                        controller.cancel_comment();
                        println!("comment form opened; pass --author to submit");
                    }
                }
            }
        }
        Command::Favorite { dish } => {
            let mut controller = open(dish).await?;
            let outcome = controller.press_favorite().await?;
            println!("{}", outcome.as_str());
        }
        Command::Comment {
            dish,
            rating,
            author,
            text,
            cancel,
        } => {
            let mut controller = open(dish).await?;
            controller.press_comment();
            fill_form(&mut controller, rating, author, text)?;
            if cancel {
                controller.cancel_comment();
                println!("comment discarded");
            } else {
                controller.submit_comment()?;
                println!("comment submitted");
            }
        }
        Command::Share { dish } => {
            open(dish).await?.share();
        }
    }
    Ok(())
}

fn fill_form(
    controller: &mut DishDetailController,
    rating: u8,
    author: String,
    text: String,
) -> Result<()> {
    controller
        .set_rating(rating)
        .context("rating must be between 1 and 5")?;
    controller.set_author(author)?;
    controller.set_comment(text)?;
    Ok(())
}

async fn print_detail(controller: &DishDetailController) -> Result<()> {
    let dish = controller.dish();
    let heart = if controller.is_favorite().await? {
        "favorite"
    } else {
        "not favorite"
    };
    println!("{} ({heart})", dish.name);
    println!("{}", dish.description);
    println!();
    println!("Comments");
    for comment in controller.comments().await? {
        println!("{}", comment.comment);
        println!("{}/5", comment.rating.get());
        println!("-- {}, {}", comment.author, comment.date.to_rfc2822());
        println!();
    }
    Ok(())
}
