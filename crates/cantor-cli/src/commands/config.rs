use anyhow::Result;
use cantor_search::{config, Config};

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    let search = &config.search;
    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!("  search.page_size: {}", search.page_size);
    println!("  search.navigation_pages: {}", search.navigation_pages);
    println!("  search.cache_capacity: {}", search.cache_capacity);
    println!("  search.cache_ttl_secs: {}", search.cache_ttl_secs);
    println!("  search.similarity_threshold: {}", search.similarity_threshold);
    println!("  search.similar_count: {}", search.similar_count);
    println!(
        "  search.japanese_dictionary: {}",
        search.japanese_dictionary.as_deref().unwrap_or("(built-in)")
    );
    println!(
        "  search.korean_dictionary: {}",
        search.korean_dictionary.as_deref().unwrap_or("(built-in)")
    );

    println!("\nPriority: CLI args > ENV vars (CANTOR_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure cantor.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
