//! Basic usage example for the klippy library.
//!
//! Looks up the tags, manifest overview and build commands of a public image.
//!
//! Run with: cargo run --example basic_usage -- library/alpine:3.6

use libklippy::Klippy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reference = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "library/alpine:3.6".to_string());

    println!("Klippy Library - Basic Usage Example\n");

    let klippy = Klippy::new()?;

    let resolved = klippy.resolve(&reference).await?;
    println!("✓ Resolved {} to {}\n", reference, resolved);

    match klippy.list_tags(&reference).await {
        Ok(tags) => {
            println!("✓ Found {} tags:", tags.len());
            for tag in tags.iter().take(10) {
                println!("  - {}", tag);
            }
            if tags.len() > 10 {
                println!("  ... and {} more", tags.len() - 10);
            }
            println!();
        }
        Err(e) => {
            eprintln!("✗ Failed to list tags: {}", e);
            return Ok(());
        }
    }

    let overview = klippy.overview(&reference).await?;
    println!(
        "✓ {}:{} ({}) has {} layers\n",
        overview.name,
        overview.tag,
        overview.architecture,
        overview.layers.len()
    );

    println!("Build commands (newest layer first):");
    for command in klippy.build_commands(&reference).await? {
        println!("  [{}] {}", command.layer, command.text);
    }

    Ok(())
}
