pub mod config;
pub mod edit;
pub mod search;
pub mod status;

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use cantor_core::model::{RankedHymn, Tier};
use cantor_core::schema::Database;
use cantor_search::{Analyzers, Config, HymnService, NlpCache};

/// Open the catalog named by `config` behind a fresh service.
pub fn open_service(config: &Config) -> Result<HymnService<Database>> {
    let db = Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database {}",
            config.database_path.display()
        )
    })?;
    log::debug!("Opened catalog at {}", config.database_path.display());
    let analyzers =
        Analyzers::load(&config.search).context("Failed to load morphological dictionaries")?;
    let cache = Arc::new(NlpCache::from_settings(&config.search));
    Ok(HymnService::new(db, cache, config.search.clone()).with_analyzers(&analyzers))
}

/// Where command results go: a plain table or JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    pub const fn is_json(self) -> bool {
        self.json
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print hymns as JSON or as one row each.
    pub fn hymns(self, hymns: &[RankedHymn]) -> Result<()> {
        if self.json {
            return self.json(hymns);
        }
        if hymns.is_empty() {
            println!("  No hymns found.");
        }
        for hymn in hymns {
            println!("{}", format_row(hymn));
        }
        Ok(())
    }
}

pub const fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::ExactName => "exact",
        Tier::FuzzyNameOrSimilarity => "similar",
        Tier::LyricOrPhoneticMatch => "lyric",
        Tier::FallbackPool => "other",
    }
}

/// One table row: id, tier, display name and Korean title.
pub fn format_row(hymn: &RankedHymn) -> String {
    if hymn.name_kr.is_empty() {
        format!("{:>6}  {:<8} {}", hymn.id.get(), tier_label(hymn.tier), hymn.display_name)
    } else {
        format!(
            "{:>6}  {:<8} {} / {}",
            hymn.id.get(),
            tier_label(hymn.tier),
            hymn.display_name,
            hymn.name_kr
        )
    }
}
