//! # Sample Data Loader
//!
//! Loads the Madang sample books, customers and orders for development.
//!
//! ## Usage
//! ```bash
//! # Load into ./madang_dev.db (default)
//! cargo run -p madang-db --bin seed
//!
//! # Specify database path
//! cargo run -p madang-db --bin seed -- --db ./data/madang.db
//!
//! # Wipe existing rows first
//! cargo run -p madang-db --bin seed -- --force
//! ```
//!
//! Customer 1 (박지성) is loaded as `admin`, so logging in as custid 1
//! unlocks the catalog write endpoints.

use anyhow::Context;
use clap::Parser;
use madang_db::{sample, Database, DbConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Madang sample data loader")]
struct Args {
    /// Database file path
    #[arg(short, long, env = "MADANG_DB", default_value = "./madang_dev.db")]
    db: String,

    /// Delete existing books, customers and orders before loading
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("🌱 Madang Sample Data Loader");
    println!("============================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::new(&args.db))
        .await
        .with_context(|| format!("opening {}", args.db))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if args.force {
        // Children first: Orders references Book and Customer.
        for table in ["Orders", "Customer", "Book"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(db.pool())
                .await
                .with_context(|| format!("clearing {}", table))?;
        }
        println!("✓ Existing rows removed");
    } else {
        let existing = db.books().count().await?;
        if existing > 0 {
            println!("⚠ Database already has {} books", existing);
            println!("  Skipping load to avoid duplicates.");
            println!("  Re-run with --force to replace them.");
            return Ok(());
        }
    }

    let summary = sample::load(&db).await.context("loading sample data")?;

    println!();
    println!(
        "✓ Loaded {} books, {} customers, {} orders",
        summary.books, summary.customers, summary.orders
    );

    let overview = db.stats().overview().await?;
    println!(
        "  Revenue: {} over {} orders",
        overview.total_revenue, overview.total_orders
    );

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
