use clap::{ArgAction, Parser, Subcommand};
use commands::{config, details, favorites, review, search, AppContext};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "moviecatalog")]
#[command(about = "Movie catalog - search OMDb, keep favorites and write reviews")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    #[command(long_about = "Search the catalog by title. An empty term falls back to the configured default term. Results are filtered by genre when --genre is given; --pages loads further result pages.")]
    Search {
        /// Title search term
        term: Option<String>,

        /// Restrict to a release year
        #[arg(long)]
        year: Option<String>,

        /// Keep only movies whose genre contains this text (case-insensitive)
        #[arg(long)]
        genre: Option<String>,

        /// Number of result pages to load
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=20))]
        pages: u32,
    },
    /// Show a movie with its favorite flag and reviews
    Details {
        /// IMDb identifier, e.g. tt0133093
        imdb_id: String,
    },
    /// Manage favorite movies
    Favorites {
        #[command(subcommand)]
        cmd: Option<FavoritesCommands>,
    },
    /// Write and read reviews
    Review {
        #[command(subcommand)]
        cmd: ReviewCommands,
    },
    /// Show or create the configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum FavoritesCommands {
    /// List favorites with their catalog details
    List,
    /// Mark a movie as favorite
    Add { imdb_id: String },
    /// Remove a movie from favorites
    Remove { imdb_id: String },
    /// Flip the favorite flag of a movie
    Toggle { imdb_id: String },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Add a review for a movie
    Add {
        imdb_id: String,

        /// Reviewer name
        #[arg(long)]
        name: String,

        /// Review text
        #[arg(long)]
        message: String,

        /// Rating from 1 to 5 stars
        #[arg(long)]
        rating: u8,
    },
    /// List the reviews of a movie, newest last
    List { imdb_id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show,
    /// Write a config file with defaults
    Init {
        /// OMDb API key to store
        #[arg(long)]
        api_key: Option<String>,

        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = AppContext::load(cli.config)?;

    logging::init_logging(cli.verbose, cli.quiet, ctx.log_file())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let result = match cli.command {
        Commands::Search { term, year, genre, pages } => {
            search::run_search(&ctx, term, year, genre, pages, &output).await
        }
        Commands::Details { imdb_id } => details::run_details(&ctx, &imdb_id, &output).await,
        Commands::Favorites { cmd } => {
            favorites::run_favorites(&ctx, cmd.unwrap_or(FavoritesCommands::List), &output).await
        }
        Commands::Review { cmd } => review::run_review(&ctx, cmd, &output).await,
        Commands::Config { cmd } => config::run_config(&ctx, cmd.unwrap_or(ConfigCommands::Show), &output),
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }
    result
}
