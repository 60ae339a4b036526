use clap::{Parser, Subcommand};
use gigsearch::domain::{Category, DEFAULT_RADIUS};
use std::path::PathBuf;

/// CLI arguments for gigsearch
#[derive(Debug, Parser)]
#[command(
    name = "gigsearch",
    version,
    about = "Search live events near you, keep recent searches and local favorites"
)]
pub struct CliArgs {
    /// Path to a TOML configuration file. Without one, `GIGSEARCH_*`
    /// environment variables are read (e.g. GIGSEARCH_API_BASE_URL)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search for events
    Search {
        /// Keyword to search for (e.g. "jazz", "Taylor Swift")
        keyword: String,

        /// City or "lat,lon" to search around
        #[arg(short = 'l', long = "location", default_value = "")]
        location: String,

        /// Detect the location automatically instead
        #[arg(short = 'a', long = "auto")]
        auto_detect: bool,

        /// Category: music, sports, arts, film, misc, or a segment id
        #[arg(short = 'g', long = "category", default_value = "default", value_parser = parse_category)]
        category: Category,

        /// Search radius in miles
        #[arg(short = 'r', long = "radius", default_value = DEFAULT_RADIUS)]
        radius: String,
    },

    /// Show keyword suggestions for what has been typed so far
    Suggest {
        /// Partial keyword; omit for the empty-field suggestions
        #[arg(default_value = "")]
        prefix: String,
    },

    /// List recent searches
    Recent {
        /// Forget all recent searches
        #[arg(long = "clear")]
        clear: bool,
    },

    /// Manage locally saved favorite events
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesCommand>,
    },

    /// Show one event in detail
    Event {
        /// Event id as printed by `search`
        id: String,
    },

    /// Look up a venue by name
    Venue {
        /// Venue name or part of it
        keyword: String,
    },

    /// Detect the current location
    Locate,

    /// Check that the event directory is reachable
    Health,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites (the default)
    List,

    /// Save an event, or unsave it if already saved
    Toggle {
        /// Event id
        id: String,
    },

    /// Unsave an event
    Remove {
        /// Event id
        id: String,
    },

    /// Unsave every event
    Clear,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category {value:?}; try music, sports, arts, film or misc"))
}
