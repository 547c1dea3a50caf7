//! EliteShop CLI - Browse the catalog, manage the cart and sign in.
//!
//! # Usage
//!
//! ```bash
//! # List every product, or one category
//! eliteshop products
//! eliteshop products --category electronics
//!
//! # Sign in with the demo account, then check who is signed in
//! eliteshop login --demo
//! eliteshop whoami
//!
//! # Interactive cart session
//! eliteshop shop
//! ```
//!
//! # Commands
//!
//! - `products` - List the catalog
//! - `categories` - List product categories
//! - `login` / `logout` / `whoami` - Manage the persisted session
//! - `shop` - Interactive cart over stdin

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eliteshop_core::ProductId;
use eliteshop_storefront::config::ShopConfig;
use eliteshop_storefront::error::AppError;
use eliteshop_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "eliteshop")]
#[command(author, version, about = "EliteShop storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only show this category (`all` for everything)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product in detail
    Product {
        /// Product id
        id: ProductId,
    },
    /// List product categories
    Categories,
    /// Sign in and persist the session
    Login {
        /// Username
        #[arg(short, long, default_value = "")]
        username: String,

        /// Password
        #[arg(short, long, default_value = "")]
        password: String,

        /// Use the public demo account
        #[arg(long, conflicts_with_all = ["username", "password"])]
        demo: bool,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Interactive cart session
    Shop,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eliteshop=info,eliteshop_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ShopConfig) -> Result<(), AppError> {
    let mut state = AppState::new(config)?;

    match cli.command {
        Commands::Products { category } => {
            commands::catalog::products(&state, category.as_deref()).await?;
        }
        Commands::Product { id } => commands::catalog::product(&state, id).await?,
        Commands::Categories => commands::catalog::categories(&state).await?,
        Commands::Login {
            username,
            password,
            demo,
        } => commands::account::login(&mut state, username, password, demo).await?,
        Commands::Logout => commands::account::logout(&mut state),
        Commands::Whoami => commands::account::whoami(&state)?,
        Commands::Shop => commands::shop::run(&mut state).await?,
    }
    Ok(())
}
