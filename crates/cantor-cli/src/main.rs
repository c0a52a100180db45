use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use cantor_search::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cantor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/cantor/cantor.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Search the catalog by keyword
    ///
    /// Results are ranked in tiers: exact name matches first, then names
    /// that contain or closely resemble the keyword, then hymns whose lyric
    /// or phonetic reading contains it, then the rest of the catalog.
    ///
    /// Join two keywords with '&' to require both. An empty keyword lists
    /// the whole catalog.
    Search {
        /// Keyword (omit to list everything)
        #[arg(default_value = "")]
        keyword: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Records per page (default: search.page_size)
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Pick a random page of hymns matching a keyword
    Random {
        #[arg(default_value = "")]
        keyword: String,

        /// Number of hymns to pick (default: search.page_size)
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Show one hymn
    Show { id: i64 },
    /// Show a hymn and the hymns with the most similar lyrics
    Similar { id: i64 },
    /// Add a hymn
    Add {
        /// Japanese title
        name_jp: String,

        /// Korean title
        #[arg(long, default_value = "")]
        name_kr: String,

        #[arg(long, default_value = "")]
        lyric: String,

        /// Video link
        #[arg(long, default_value = "")]
        link: String,

        /// Mark the hymn as classical
        #[arg(long)]
        classical: bool,

        /// Id of the editing user
        #[arg(long, default_value_t = 0)]
        actor: i64,
    },
    /// Edit a hymn; fields not given keep their value
    Update {
        id: i64,

        #[arg(long)]
        name_jp: Option<String>,

        #[arg(long)]
        name_kr: Option<String>,

        #[arg(long)]
        lyric: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long, default_value_t = 0)]
        actor: i64,
    },
    /// Delete a hymn (it can be restored)
    Delete {
        id: i64,

        #[arg(long, default_value_t = 0)]
        actor: i64,
    },
    /// Restore a deleted hymn
    Restore {
        id: i64,

        #[arg(long, default_value_t = 0)]
        actor: i64,
    },
    /// Show catalog size and cache usage
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Create the config file with defaults
    Init,
    /// Print an example config file
    Example,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Show => commands::config::show_config(),
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Init => commands::config::init_config(),
            ConfigCommand::Example => commands::config::show_example(),
        };
    }

    let config = match cli.db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };

    // Ensure database directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let output = commands::Output::new(cli.json);
    let mut service = commands::open_service(&config)?;
    let page_size = |requested: Option<usize>| requested.unwrap_or(config.search.page_size);

    match cli.command {
        Commands::Search {
            keyword,
            page,
            page_size: size,
        } => commands::search::run_search(&service, &output, &keyword, page, page_size(size))?,
        Commands::Random {
            keyword,
            page_size: size,
        } => commands::search::run_random(&mut service, &output, &keyword, page_size(size))?,
        Commands::Show { id } => commands::search::run_show(&service, &output, id)?,
        Commands::Similar { id } => commands::search::run_similar(&service, &output, id)?,
        Commands::Add {
            name_jp,
            name_kr,
            lyric,
            link,
            classical,
            actor,
        } => {
            let draft = commands::edit::draft(name_jp, name_kr, lyric, link, classical, actor);
            commands::edit::run_add(&service, &output, draft)?;
        }
        Commands::Update {
            id,
            name_jp,
            name_kr,
            lyric,
            link,
            actor,
        } => {
            let changes = commands::edit::Changes {
                name_jp,
                name_kr,
                lyric,
                link,
            };
            commands::edit::run_update(&service, &output, id, changes, actor)?;
        }
        Commands::Delete { id, actor } => commands::edit::run_delete(&service, id, actor)?,
        Commands::Restore { id, actor } => commands::edit::run_restore(&service, id, actor)?,
        Commands::Status => commands::status::show_status(&service, &config)?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
