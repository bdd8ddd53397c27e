//! CLI for one-off deal lookups against the live API.
//!
//! Runs the same service graph as the server, once, and prints a colored
//! summary instead of serving HTTP.
//!
//! # Usage
//!
//! ```bash
//! # One product with the configured variants
//! cargo run --bin lookup -- product 1005001
//!
//! # One product with chosen variants
//! cargo run --bin lookup -- product 1005001 --variants coin,bigsave
//!
//! # Everything linked in a message
//! cargo run --bin lookup -- message "look https://s.click.aliexpress.com/e/_DdwUZVd"
//!
//! # Effective configuration with secrets masked
//! cargo run --bin lookup -- config
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`aliexpress_deals::config`].

use aliexpress_deals::application::services::{ProductReply, ReplyStatus};
use aliexpress_deals::config::{self, Config, mask_secret};
use aliexpress_deals::domain::entities::{LinkOutcome, LinkVariant, ProductKey};
use aliexpress_deals::server::build_state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

/// One-off AliExpress deal lookups.
#[derive(Parser)]
#[command(name = "lookup")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single product
    Product {
        /// Numeric product id
        id: String,

        /// Comma-separated variants (default: LINK_VARIANTS)
        #[arg(short, long)]
        variants: Option<String>,
    },

    /// Process a chat message
    Message {
        /// Message text containing AliExpress links
        text: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Product { id, variants } => product(&config, &id, variants.as_deref()).await?,
        Commands::Message { text } => message(&config, &text).await?,
        Commands::Config => print_config(&config),
    }

    Ok(())
}

async fn product(config: &Config, id: &str, variants: Option<&str>) -> Result<()> {
    let product_id = ProductKey::parse(id)
        .with_context(|| format!("'{}' is not a numeric product id", id))?;
    let variants = match variants {
        Some(raw) => LinkVariant::parse_list(raw)?,
        None => config.link_variants()?,
    };
    if variants.is_empty() {
        anyhow::bail!("At least one variant is required");
    }

    let state = build_state(config)?;

    println!("{}", format!("Looking up product {}...", product_id).cyan());
    match state.deal_service.lookup(&product_id, &variants).await {
        Ok(reply) => print_reply(&reply),
        Err(e) => println!("{} {}", "✗".red().bold(), format!("{:?}", e).red()),
    }

    Ok(())
}

async fn message(config: &Config, text: &str) -> Result<()> {
    let state = build_state(config)?;

    let report = match state.deal_service.handle_message(text).await {
        Ok(report) => report,
        Err(e) => {
            println!("{} {:?}", "✗".red().bold(), e);
            return Ok(());
        }
    };

    println!(
        "{} {} product(s): {} ok, {} failed",
        "Processed".bold(),
        report.summary.total,
        report.summary.successful.to_string().green(),
        report.summary.failed.to_string().red()
    );

    for short in &report.unresolved {
        println!("  {} unresolved short link {}", "!".yellow(), short.dimmed());
    }

    for item in &report.items {
        println!();
        print_reply(item);
    }

    Ok(())
}

fn print_reply(reply: &ProductReply) {
    let status = match reply.status {
        ReplyStatus::Ok => "ok".green().bold(),
        ReplyStatus::NoOffers => "no offers".yellow().bold(),
        ReplyStatus::Unavailable => "unavailable".red().bold(),
    };
    println!("{} {} [{}]", "Product".bold(), reply.product_id.to_string().cyan(), status);

    let Some(bundle) = &reply.bundle else {
        return;
    };

    match &bundle.detail {
        Some(detail) => {
            println!("  {}", detail.title.bold());
            if let Some(price) = &detail.price {
                println!("  {} {}", "Price:".dimmed(), price);
            }
        }
        None => println!("  {}", "details unavailable".dimmed()),
    }

    for link in &bundle.links {
        match &link.outcome {
            LinkOutcome::Resolved { url } => {
                println!("  {} {:<18} {}", "✓".green(), link.variant.label(), url)
            }
            LinkOutcome::Failed { cause } => {
                println!("  {} {:<18} {}", "✗".red(), link.variant.label(), cause.red())
            }
        }
    }
}

fn print_config(config: &Config) {
    println!("{}", "Configuration".bold());
    println!("  {:<22} {}", "Listen:", config.listen_addr);
    println!("  {:<22} {}", "API:", config.api_url);
    println!("  {:<22} {}", "App key:", mask_secret(&config.app_key));
    println!("  {:<22} {}", "App secret:", mask_secret(&config.app_secret));
    println!("  {:<22} {}", "Tracking id:", config.tracking_id);
    println!(
        "  {:<22} {} / {} / {}",
        "Locale:", config.target_currency, config.target_language, config.query_country
    );
    println!("  {:<22} {}s", "Cache TTL:", config.cache_ttl_seconds);
    println!("  {:<22} {}s", "Eviction interval:", config.eviction_interval_seconds);
    println!(
        "  {:<22} {}s, {} retries",
        "Upstream timeout:", config.upstream_timeout_seconds, config.upstream_max_retries
    );
    println!("  {:<22} {}", "Link variants:", config.link_variants.yellow());
}
