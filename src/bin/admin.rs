//! CLI administration tool for bob-shortener.
//!
//! Inspects and moderates short links directly in PostgreSQL, without going
//! through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List links created by an owner
//! cargo run --bin admin -- links --owner user@example.com
//!
//! # Disable or re-enable a link
//! cargo run --bin admin -- disable a1b2c3
//! cargo run --bin admin -- enable a1b2c3
//!
//! # Show the click log of a link
//! cargo run --bin admin -- clicks a1b2c3
//!
//! # Register an account so it may create links
//! cargo run --bin admin -- account add user@example.com
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//!
//! A running server re-reads any cached link older than
//! `CACHE_REVALIDATE_SECONDS` before redirecting, so a disable issued here
//! stops redirects within that window.

use bob_shortener::domain::entities::Identity;
use bob_shortener::domain::repositories::LinkRepository;
use bob_shortener::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing bob-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// List links created by an owner
    Links {
        /// Owner email, or client IP for guest links
        #[arg(short, long)]
        owner: String,
    },

    /// Disable a link so it no longer redirects
    Disable {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Re-enable a disabled link
    Enable { code: String },

    /// Show the click log of a link
    Clicks { code: String },

    /// Manage registered accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Account management subcommands.
#[derive(Subcommand)]
enum AccountAction {
    /// Register an email address
    Add { email: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Links { owner } => list_links(&repo, &owner).await?,
        Commands::Disable { code, yes } => set_disabled(&repo, &code, true, yes).await?,
        Commands::Enable { code } => set_disabled(&repo, &code, false, true).await?,
        Commands::Clicks { code } => show_clicks(&repo, &code).await?,
        Commands::Account { action } => handle_account_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Lists an owner's links, newest first.
///
/// # Output Format
///
/// ```text
/// 📋 Links of user@example.com
///
///   Code         Clicks   Created              Status    Target
///   ──────────────────────────────────────────────────────────────────────
///   a1b2c3       12       2025-01-15 10:30     ACTIVE    https://example.com/a
/// ```
async fn list_links(repo: &PgLinkRepository, owner: &str) -> Result<()> {
    println!(
        "{} {}",
        "📋 Links of".bright_blue().bold(),
        owner.bright_blue().bold()
    );
    println!();

    let links = repo
        .list_by_owner(owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<8} {:<20} {:<9} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        let status = if link.disabled {
            "DISABLED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<12} {:<8} {:<20} {:<9} {}",
            link.code.cyan(),
            link.click_count,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status,
            link.original_url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Flips a link's disabled flag, asking first when disabling.
async fn set_disabled(
    repo: &PgLinkRepository,
    code: &str,
    disabled: bool,
    skip_confirm: bool,
) -> Result<()> {
    let link = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    if link.disabled == disabled {
        let state = if disabled { "disabled" } else { "enabled" };
        println!("{}", format!("⚠️  This link is already {state}").yellow());
        return Ok(());
    }

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.original_url);
    println!("  Owner:  {}", link.owner_id.bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Disable this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.set_disabled(code, disabled)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update link: {}", e))?;

    let done = if disabled { "disabled" } else { "enabled" };
    println!("{}", format!("✅ Link {done}").green().bold());

    Ok(())
}

/// Prints the click log of a link, oldest first.
async fn show_clicks(repo: &PgLinkRepository, code: &str) -> Result<()> {
    repo.find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    let clicks = repo
        .list_clicks(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list clicks: {}", e))?;

    println!("{} {}", "🖱  Clicks of".bright_blue().bold(), code.cyan());
    println!();

    if clicks.is_empty() {
        println!("{}", "  No clicks recorded".yellow());
        return Ok(());
    }

    for click in &clicks {
        println!(
            "  {}  {:<40} {} / {} ({})",
            click
                .clicked_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black(),
            click.ip,
            click.user_agent.browser,
            click.user_agent.device,
            click.user_agent.device_class
        );
    }

    println!();
    println!("  Total: {}", clicks.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Handles account commands.
async fn handle_account_action(action: AccountAction, pool: &PgPool) -> Result<()> {
    match action {
        AccountAction::Add { email } => {
            let identity = Identity::authenticated(&email)
                .map_err(|e| anyhow::anyhow!("Invalid email: {}", e))?;

            let inserted = sqlx::query(
                "INSERT INTO users (email) VALUES ($1) ON CONFLICT (email) DO NOTHING",
            )
            .bind(identity.owner_id())
            .execute(pool)
            .await?
            .rows_affected();

            if inserted == 0 {
                println!("{}", "⚠️  Account already exists".yellow());
            } else {
                println!("{}", "✅ Account registered".green().bold());
            }
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of clicks
/// - Number of registered accounts
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    let accounts_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:    {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:   {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!(
        "  Accounts: {}",
        accounts_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
