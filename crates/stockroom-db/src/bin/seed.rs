//! # Seed Data Generator
//!
//! Populates an inventory database with sample records for development.
//!
//! ## Usage
//! ```bash
//! # 200 records into the default database (STOCKROOM_DB_PATH or the data dir)
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amount and location
//! cargo run -p stockroom-db --bin seed -- --count 1000 --db ./data/inventory.db
//! ```
//!
//! Records are written with `create_or_merge`, so running the seeder twice
//! adds to the existing quantities instead of failing or duplicating rows.

use clap::Parser;
use std::path::PathBuf;
use stockroom_core::NewItem;
use stockroom_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Sample products per category, with the brands that sell them.
const CATALOG: &[(&str, &[&str], &[&str])] = &[
    (
        "Hygiene",
        &["Soap", "Shampoo", "Conditioner", "Toothpaste", "Deodorant", "Floss"],
        &["Dove", "Colgate", "Nivea", "Rexona"],
    ),
    (
        "Food",
        &["Rice", "Beans", "Pasta", "Coffee", "Sugar", "Flour", "Salt", "Oats"],
        &["Camil", "Tio Joao", "Barilla", "Pilao"],
    ),
    (
        "Cleaning",
        &["Detergent", "Bleach", "Sponge", "Glass Cleaner", "Fabric Softener"],
        &["Ype", "Veja", "Omo", "Scotch-Brite"],
    ),
    (
        "Beverages",
        &["Orange Juice", "Mineral Water", "Green Tea", "Cola"],
        &["Del Valle", "Crystal", "Lipton", "Coca-Cola"],
    ),
];

/// Stockroom seed data generator.
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Populate an inventory database with sample records")]
struct Args {
    /// Number of records to write
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Database file path (default: STOCKROOM_DB_PATH or the platform data dir)
    #[arg(short, long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let config = match args.db {
        Some(path) => DbConfig::new(path),
        None => DbConfig::from_env(),
    };

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!("Records:  {}", args.count);
    println!();

    let db = Database::connect(config).await?;
    let repo = db.inventory();
    let existing = repo.count().await?;
    if existing > 0 {
        println!("Database already has {} records; quantities will be merged.", existing);
    }

    let start = std::time::Instant::now();
    let mut inserted = 0usize;
    let mut merged = 0usize;

    for (seed, item) in sample_items().take(args.count).enumerate() {
        match repo.create_or_merge(&item).await {
            Ok(outcome) if outcome.merged => merged += 1,
            Ok(_) => inserted += 1,
            Err(e) => {
                warn!(name = %item.name, error = %e, "Skipping sample record");
                continue;
            }
        }

        if (seed + 1) % 100 == 0 {
            info!(written = seed + 1, "Seeding in progress");
        }
    }

    let elapsed = start.elapsed();
    let categories = repo.list_distinct_categories().await?;
    let brands = repo.list_distinct_brands().await?;

    println!("Inserted {} and merged {} records in {:?}", inserted, merged, elapsed);
    println!("Total records: {}", repo.count().await?);
    println!("Categories:    {}", categories.join(", "));
    println!("Brands:        {}", brands.len());

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Endless, deterministic stream of sample records.
///
/// Each (product, brand) pair appears once per round, named `"<product> #N"`
/// from the second round on, so every record has a distinct key.
fn sample_items() -> impl Iterator<Item = NewItem> {
    (0usize..).flat_map(|round| {
        CATALOG.iter().flat_map(move |&(category, products, brands)| {
            products.iter().enumerate().flat_map(move |(p, &product)| {
                brands.iter().enumerate().map(move |(b, &brand)| {
                    let name = match round {
                        0 => product.to_string(),
                        r => format!("{} #{}", product, r + 1),
                    };
                    let quantity = ((round * 31 + p * 7 + b * 3) % 51) as i64;
                    NewItem::new(name, brand, category, quantity)
                })
            })
        })
    })
}
