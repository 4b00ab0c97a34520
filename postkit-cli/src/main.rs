//! Developer CLI for `PostKit`.
//!
//! Drives local authentication, user posts and the incremental feed against
//! on-disk storage, the same way an app host would.

mod device_key;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use eyre::{bail, eyre, Result, WrapErr};
use postkit::auth::{is_valid_email, normalize_email};
use postkit::feed::{FeedConfig, FeedView, SeedDataset, DEFAULT_BATCH_SIZE, DEFAULT_INITIAL_COUNT};
use postkit::{PostDraft, PostKit};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "postkit";

#[derive(Parser)]
#[command(name = "postkit", version, about = "PostKit developer CLI", long_about = None)]
struct Cli {
    /// Directory holding credentials, posts and the device key
    #[arg(long, global = true, env = "POSTKIT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new user and sign in
    Signup(Credentials),
    /// Sign in with email and password
    Login(Credentials),
    /// Sign out, keeping registered users
    Logout,
    /// Show the current session
    Status,
    /// Biometric sign-in and settings
    Biometric {
        #[command(subcommand)]
        command: BiometricCommand,
    },
    /// Manage your posts
    Post {
        #[command(subcommand)]
        command: PostCommand,
    },
    /// Load the merged feed and report reveal progress
    Feed(FeedArgs),
}

#[derive(Args)]
struct Credentials {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "POSTKIT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Clone, Copy, Subcommand)]
enum BiometricCommand {
    /// Report biometric capability of this device
    Status,
    /// Sign in with biometrics
    Login,
    /// Turn biometric sign-in on for the current user
    Enable,
    /// Turn biometric sign-in off for the current user
    Disable,
}

#[derive(Subcommand)]
enum PostCommand {
    /// Publish a post as the signed-in user
    Create {
        /// Post title (1 to 25 characters)
        #[arg(long)]
        title: String,

        /// Optional body text
        #[arg(long, default_value = "")]
        description: String,

        /// Optional image URI
        #[arg(long)]
        image: Option<String>,
    },
    /// List your posts, newest first
    List,
    /// Delete all of your posts
    Clear,
}

#[derive(Args)]
struct FeedArgs {
    /// Seed dataset (`{"posts": [...]}` JSON)
    #[arg(long, env = "POSTKIT_SEED")]
    seed: Option<PathBuf>,

    /// Seed posts shown immediately
    #[arg(long, default_value_t = DEFAULT_INITIAL_COUNT)]
    initial_count: usize,

    /// Seed posts revealed per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Print the first N posts of the loaded feed
    #[arg(long, default_value_t = 10)]
    show: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| eyre!("no platform data directory, pass --data-dir"))?,
    };

    let keystore = device_key::load_or_create(&data_dir).await?;
    let app = PostKit::open(&data_dir, Arc::new(keystore))
        .await
        .wrap_err_with(|| format!("failed to open data directory {}", data_dir.display()))?;

    match cli.command {
        Command::Signup(credentials) => signup(&app, &credentials, cli.json).await,
        Command::Login(credentials) => login(&app, &credentials, cli.json).await,
        Command::Logout => {
            app.auth().logout().await?;
            println!("{}", done_line("Signed out", cli.json));
            Ok(())
        }
        Command::Status => status(&app, cli.json).await,
        Command::Biometric { command } => biometric(&app, command, cli.json).await,
        Command::Post { command } => post(&app, command, cli.json).await,
        Command::Feed(args) => feed(app, &args, cli.json).await,
    }
}

async fn signup(app: &PostKit, credentials: &Credentials, as_json: bool) -> Result<()> {
    let email = normalize_email(&credentials.email);
    if !email.is_empty() && !is_valid_email(&email) {
        bail!("{email} is not a valid email address");
    }

    let outcome = app.auth().signup(&email, &credentials.password).await?;
    if as_json {
        println!(
            "{}",
            json!({
                "success": outcome.success,
                "message": outcome.message,
                "askBiometric": outcome.ask_biometric,
            })
        );
    } else if outcome.success {
        println!("Signed up and signed in as {email}");
        if outcome.ask_biometric {
            println!("Tip: run `postkit biometric enable` to sign in with biometrics");
        }
    } else {
        bail!(
            "signup failed: {}",
            outcome.message.unwrap_or_else(|| "unknown reason".to_string())
        );
    }
    Ok(())
}

async fn login(app: &PostKit, credentials: &Credentials, as_json: bool) -> Result<()> {
    let email = normalize_email(&credentials.email);
    let success = app.auth().login(&email, &credentials.password).await?;
    if as_json {
        println!("{}", json!({ "success": success }));
    } else if success {
        println!("Signed in as {email}");
    } else {
        bail!("invalid email or password");
    }
    Ok(())
}

async fn status(app: &PostKit, as_json: bool) -> Result<()> {
    let status = app.auth().check_auth_status().await;
    if as_json {
        println!(
            "{}",
            json!({
                "isAuthenticated": status.is_authenticated,
                "email": status.email,
            })
        );
    } else if let Some(email) = status.email {
        println!("Signed in as {email}");
    } else {
        println!("Signed out");
    }
    Ok(())
}

async fn biometric(app: &PostKit, command: BiometricCommand, as_json: bool) -> Result<()> {
    let outcome = match command {
        BiometricCommand::Status => {
            let availability = app.auth().biometric_availability();
            if as_json {
                println!(
                    "{}",
                    json!({
                        "available": availability.available,
                        "label": availability.label,
                    })
                );
            } else if availability.available {
                println!("{} available", availability.label);
            } else {
                println!("No biometric hardware available");
            }
            return Ok(());
        }
        BiometricCommand::Login => app.auth().login_with_biometric(),
        BiometricCommand::Enable => app.auth().update_biometric_setting(true).await?,
        BiometricCommand::Disable => app.auth().update_biometric_setting(false).await?,
    };

    if as_json {
        println!(
            "{}",
            json!({ "success": outcome.success, "message": outcome.message })
        );
    } else if outcome.success {
        println!("Done");
    } else {
        bail!(
            "{}",
            outcome
                .message
                .unwrap_or_else(|| "no signed-in user".to_string())
        );
    }
    Ok(())
}

async fn post(app: &PostKit, command: PostCommand, as_json: bool) -> Result<()> {
    match command {
        PostCommand::Create {
            title,
            description,
            image,
        } => {
            let Some(author) = app.auth().check_auth_status().await.email else {
                bail!("sign in to create posts");
            };
            let post = app
                .posts()
                .publish(&PostDraft {
                    title,
                    author,
                    description,
                    image,
                })
                .await?;
            if as_json {
                println!("{}", serde_json::to_string(&post)?);
            } else {
                println!("Published \"{}\"", post.title);
            }
        }
        PostCommand::List => {
            let posts = app.posts().get_user_posts().await;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                println!("No posts yet");
            } else {
                for post in &posts {
                    println!("{} by {}", post.title, post.author);
                }
            }
        }
        PostCommand::Clear => {
            app.posts().clear_user_posts().await;
            println!("{}", done_line("Cleared your posts", as_json));
        }
    }
    Ok(())
}

async fn feed(app: PostKit, args: &FeedArgs, as_json: bool) -> Result<()> {
    let mut app = app.with_feed_config(FeedConfig {
        initial_count: args.initial_count,
        batch_size: args.batch_size,
    });
    if let Some(path) = &args.seed {
        let seed = SeedDataset::from_path(path)
            .await
            .wrap_err_with(|| format!("failed to load seed dataset {}", path.display()))?;
        app = app.with_seed(seed);
    }

    let handle = app.feed().activate()?;
    let mut updates = handle.subscribe();
    tracing::info!(posts = handle.snapshot().len(), "feed activated");

    while updates.changed().await.is_ok() {
        let view = updates.borrow_and_update().clone();
        tracing::info!(
            posts = view.len(),
            batches = view.batches_revealed(),
            loading = view.is_loading(),
            "feed updated"
        );
        if !view.is_loading() {
            break;
        }
    }

    let view = handle.snapshot();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&feed_json(&view, args.show))?);
    } else {
        println!(
            "{} posts ({} yours, {} of {} seed) in {} batches",
            view.len(),
            view.user_posts().len(),
            view.seed_revealed(),
            view.seed_total(),
            view.batches_revealed()
        );
        for post in view.iter().take(args.show) {
            println!("  {} by {}", post.title, post.author);
        }
    }
    Ok(())
}

/// Output for commands that only report completion.
fn done_line(message: &str, as_json: bool) -> String {
    if as_json {
        json!({ "success": true }).to_string()
    } else {
        message.to_string()
    }
}

fn feed_json(view: &FeedView, show: usize) -> serde_json::Value {
    json!({
        "total": view.len(),
        "userPosts": view.user_posts().len(),
        "seedRevealed": view.seed_revealed(),
        "seedTotal": view.seed_total(),
        "batches": view.batches_revealed(),
        "posts": view.iter().take(show).collect::<Vec<_>>(),
    })
}
