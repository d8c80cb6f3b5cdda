//! # Seed Data Generator
//!
//! Populates a catalog database with zones, tax rates, shipping methods
//! and tagged variants for local development.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin seed
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --variants 200
//! ```
//!
//! ## Generated Data
//! - Zones: UK (GB), Europe (DE, FR, IE, NL), North America (US, CA)
//! - Tax categories `standard`, `reduced`, `zero` with a rate per zone
//! - Shipping: standard, express, free over 50.00, EU post
//! - Products across apparel / homeware / books, each with sized variants

use clap::Parser;
use tally_core::{Money, Rate, TaxCategory, TaxRate, Zone};
use tally_db::{Database, DbConfig, ShippingMethodRecord};

const ZONES: &[(&str, &str, &[&str])] = &[
    ("uk", "United Kingdom", &["GB"]),
    ("eu", "Europe", &["DE", "FR", "IE", "NL"]),
    ("na", "North America", &["US", "CA"]),
];

const CATEGORIES: &[(&str, &str)] = &[
    ("standard", "Standard rate"),
    ("reduced", "Reduced rate"),
    ("zero", "Zero rate"),
];

/// (zone, category, basis points)
const RATES: &[(&str, &str, u32)] = &[
    ("uk", "standard", 2000),
    ("uk", "reduced", 500),
    ("uk", "zero", 0),
    ("eu", "standard", 2100),
    ("eu", "reduced", 900),
    ("eu", "zero", 0),
    ("na", "standard", 825),
    ("na", "reduced", 400),
];

/// (product facets, product names)
const PRODUCTS: &[(&[&str], &[&str])] = &[
    (
        &["apparel", "cotton"],
        &["Classic Tee", "Pocket Tee", "Henley", "Hoodie", "Sweatshirt"],
    ),
    (
        &["homeware"],
        &["Mug", "Tumbler", "Tea Towel", "Cushion", "Candle"],
    ),
    (
        &["books", "reduced-rate"],
        &["Field Guide", "Cookbook", "Atlas", "Notebook", "Sketchbook"],
    ),
];

const SIZES: &[&str] = &["S", "M", "L", "XL"];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Tally catalog seed data generator")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./tally_dev.db")]
    db: String,

    /// Maximum number of variants to generate
    #[arg(short, long, default_value_t = 60)]
    variants: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Tally Seed Data Generator");
    println!("=========================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database, migrations applied");

    if db.zones().count().await? > 0 {
        println!("⚠ Database already has zones, skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (id, name, members) in ZONES {
        db.zones()
            .insert(&Zone {
                id: id.to_string(),
                name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            })
            .await?;
    }
    println!("✓ {} zones", ZONES.len());

    for (id, name) in CATEGORIES {
        db.tax_rates()
            .insert_category(&TaxCategory {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await?;
    }

    for (zone, category, bps) in RATES {
        db.tax_rates()
            .insert(&TaxRate {
                id: format!("{zone}-{category}"),
                name: format!("{} {}", zone.to_uppercase(), category),
                zone_id: zone.to_string(),
                category_id: category.to_string(),
                rate: Rate::from_bps(*bps),
            })
            .await?;
    }
    println!("✓ {} tax rates", RATES.len());

    for record in shipping_methods() {
        db.shipping().insert(&record).await?;
    }
    println!("✓ {} shipping methods", db.shipping().count().await?);

    let mut generated = 0;
    'products: for (p_idx, (facets, names)) in PRODUCTS.iter().enumerate() {
        for (n_idx, name) in names.iter().enumerate() {
            let product_id = format!("p-{p_idx}-{n_idx}");
            db.variants().insert_product(&product_id, name, facets).await?;

            for size in SIZES {
                if generated >= args.variants {
                    break 'products;
                }

                let sku = format!("{}-{}", name.replace(' ', "").to_uppercase(), size);
                let variant_id = uuid::Uuid::new_v4().to_string();
                let size_facet = format!("size-{}", size.to_lowercase());

                if let Err(e) = db
                    .variants()
                    .insert_variant(&variant_id, &product_id, &sku, size, &[size_facet.as_str()])
                    .await
                {
                    eprintln!("Failed to insert {sku}: {e}");
                    continue;
                }
                generated += 1;
            }
        }
    }
    println!("✓ {generated} variants");

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

fn shipping_methods() -> Vec<ShippingMethodRecord> {
    let mut free = ShippingMethodRecord::new("free", "Free over 50.00", Money::zero());
    free.min_order_amount = Some(Money::from_cents(5000));

    let mut standard = ShippingMethodRecord::new("standard", "Standard", Money::from_cents(495));
    standard.priority = 1;

    let mut express = ShippingMethodRecord::new("express", "Express", Money::from_cents(1295));
    express.priority = 2;

    let mut eu_post = ShippingMethodRecord::new("eu-post", "EU Post", Money::from_cents(895));
    eu_post.zone_id = Some("eu".to_string());
    eu_post.priority = 3;

    vec![free, standard, express, eu_post]
}
