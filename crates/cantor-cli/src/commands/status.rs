use anyhow::Result;

use cantor_core::schema::Database;
use cantor_search::{Config, HymnService};

pub fn show_status(service: &HymnService<Database>, config: &Config) -> Result<()> {
    let total = service.total_count()?;
    let stats = service.cache_stats();

    println!("\n📊 Cantor Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Hymns: {}", total);
    println!(
        "  Cache: {} entries (capacity {}, ttl {}s)",
        stats.entries, config.search.cache_capacity, config.search.cache_ttl_secs
    );

    if total == 0 {
        println!("\n  Run `cantor add <name>` to add the first hymn");
    }

    Ok(())
}
