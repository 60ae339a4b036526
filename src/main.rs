//! gigsearch: command-line driver for the gigsearch library.
//!
//! Wires the library to the HTTP event directory, the IP lookup service and
//! the JSON file store, then runs one command and prints plain text.
//!
//! Usage examples
//! --------------
//!
//! - Search near a city
//!   $ gigsearch search jazz --location "Chicago, IL" --radius 25
//!
//! - Search near wherever this machine is
//!   $ gigsearch search "Taylor Swift" --auto
//!
//! - Suggestions while typing
//!   $ gigsearch suggest tay
//!
//! - Recent searches and favorites
//!   $ gigsearch recent
//!   $ gigsearch favorites toggle G5vYZ9gRkPxhA
//!
//! Configuration
//! -------------
//!
//! `--config <file>` reads a TOML file; otherwise `GIGSEARCH_*` environment
//! variables are used, e.g. `GIGSEARCH_IPINFO_TOKEN`.

#![allow(clippy::multiple_crate_versions)]

mod args;

use crate::args::{CliArgs, Commands, FavoritesCommand};
use clap::Parser;
use gigsearch::directory::{EventDetail, VenueDetail};
use gigsearch::domain::{Category, MappedEvent, RecentSearch, SearchForm};
use gigsearch::location::LOCATION_UNAVAILABLE;
use gigsearch::storage::Toggle;
use gigsearch::suggest::{KeywordSource, KeywordSuggestion, SuggestionGroup};
use gigsearch::{observability, Config, SearchSession, SubmitOutcome};
use std::collections::BTreeMap;
use std::process::ExitCode;

const ENV_PREFIX: &str = "GIGSEARCH_";

const LOCAL_FAVORITES_NOTICE: &str = "Favorites are saved on this device only.";

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gigsearch: {e}");
            return ExitCode::FAILURE;
        }
    };
    observability::init_tracing(&config);

    let session = match gigsearch::initialize(&config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize");
            eprintln!("gigsearch: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&session, args.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("gigsearch: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &CliArgs) -> gigsearch::Result<Config> {
    if let Some(path) = &args.config {
        return Config::from_file(path);
    }
    let vars: BTreeMap<String, String> = std::env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|name| (name.to_ascii_lowercase(), value))
        })
        .collect();
    Ok(Config::from_map(&vars))
}

async fn run(session: &SearchSession, command: Commands) -> gigsearch::Result<ExitCode> {
    match command {
        Commands::Search {
            keyword,
            location,
            auto_detect,
            category,
            radius,
        } => {
            let form = SearchForm {
                keyword,
                radius,
                category: category.segment_id().to_string(),
                location,
                auto_detect,
            };
            return Ok(search(session, &form).await);
        }
        Commands::Suggest { prefix } => match session.suggest(&prefix) {
            Some(groups) => groups.iter().for_each(print_group),
            None => println!("No suggestions"),
        },
        Commands::Recent { clear } => {
            if clear {
                session.clear_recent_searches();
                println!("Recent searches cleared");
            } else {
                let now = chrono::Utc::now().timestamp_millis();
                let recent = session.recent_searches();
                if recent.is_empty() {
                    println!("No recent searches");
                }
                for entry in &recent {
                    println!("{}", recent_line(entry, now));
                }
            }
        }
        Commands::Favorites { action } => favorites(session, action.unwrap_or(FavoritesCommand::List)).await?,
        Commands::Event { id } => print_event(&session.event_detail(&id).await?),
        Commands::Venue { keyword } => match session.venue_detail(&keyword).await? {
            Some(venue) => print_venue(&venue),
            None => println!("No venue found for {keyword:?}"),
        },
        Commands::Locate => {
            let resolution = session.locate().await;
            if !resolution.is_resolved() {
                eprintln!("{LOCATION_UNAVAILABLE}");
                return Ok(ExitCode::FAILURE);
            }
            println!("{resolution}");
        }
        Commands::Health => println!("{}", session.directory_health().await?),
    }
    Ok(ExitCode::SUCCESS)
}

async fn search(session: &SearchSession, form: &SearchForm) -> ExitCode {
    match session.submit(form).await {
        SubmitOutcome::Completed(entry) => {
            if entry.events.is_empty() {
                println!("No records found");
            }
            for event in &entry.events {
                println!("{}", event_line(event));
            }
            if let Some(recs) = session.recommendations().filter(|recs| !recs.is_empty()) {
                let related: Vec<&str> = recs.related.iter().map(|p| p.keyword.as_str()).collect();
                if !related.is_empty() {
                    println!("\nRelated: {}", related.join(", "));
                }
                let categories: Vec<&str> = recs.categories.iter().map(|(c, _)| c.label()).collect();
                println!("Explore: {}", categories.join(", "));
            }
            ExitCode::SUCCESS
        }
        SubmitOutcome::NotSubmittable => {
            eprintln!("A keyword and a location (or --auto) are required.");
            ExitCode::from(2)
        }
        SubmitOutcome::LocationUnavailable(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        SubmitOutcome::Failed { message, .. } => {
            eprintln!("Search failed: {message}");
            ExitCode::FAILURE
        }
        SubmitOutcome::Superseded => ExitCode::FAILURE,
    }
}

async fn favorites(session: &SearchSession, action: FavoritesCommand) -> gigsearch::Result<()> {
    match action {
        FavoritesCommand::List => {
            let saved = session.favorites();
            if saved.is_empty() {
                println!("No favorites yet");
            }
            for favorite in saved {
                println!("{}", event_line(&favorite.into()));
            }
        }
        FavoritesCommand::Toggle { id } => {
            let event = if session.is_favorite(&id) {
                MappedEvent {
                    id: id.clone(),
                    ..MappedEvent::default()
                }
            } else {
                session.event_detail(&id).await?.favorite_snapshot()
            };
            match session.toggle_favorite(&event) {
                Toggle::Added { show_local_notice } => {
                    println!("Saved {}", event.name);
                    if show_local_notice {
                        println!("{LOCAL_FAVORITES_NOTICE}");
                    }
                }
                Toggle::Removed => println!("Removed {id}"),
            }
        }
        FavoritesCommand::Remove { id } => {
            if session.remove_favorite(&id) {
                println!("Removed {id}");
            } else {
                println!("{id} was not a favorite");
            }
        }
        FavoritesCommand::Clear => println!("Removed {} favorites", session.clear_favorites()),
    }
    Ok(())
}

fn event_line(event: &MappedEvent) -> String {
    format!(
        "{:<20} {}  @ {}  ({})  [{}]",
        event.date_time_or_tba(),
        event.name,
        event.venue,
        event.genre,
        event.id
    )
}

fn recent_line(entry: &RecentSearch, now: i64) -> String {
    format!(
        "{} · {} · {} · {} mi · {}",
        entry.keyword,
        entry.location,
        Category::label_for(&entry.category),
        entry.radius,
        entry.time_ago(now)
    )
}

/// Wraps the highlighted character ranges of a suggestion in brackets.
fn emphasize(suggestion: &KeywordSuggestion) -> String {
    let mut out = String::with_capacity(suggestion.keyword.len() + 2 * suggestion.highlight_ranges.len());
    for (index, ch) in suggestion.keyword.chars().enumerate() {
        if suggestion.highlight_ranges.iter().any(|&(start, _)| start == index) {
            out.push('[');
        }
        out.push(ch);
        if suggestion.highlight_ranges.iter().any(|&(_, end)| end == index + 1) {
            out.push(']');
        }
    }
    out
}

fn print_group(group: &SuggestionGroup) {
    match group {
        SuggestionGroup::RecentSearches(entries) => {
            println!("Recent searches:");
            let now = chrono::Utc::now().timestamp_millis();
            for entry in entries {
                println!("  {}", recent_line(entry, now));
            }
        }
        SuggestionGroup::Keywords { source, items } => {
            println!(
                "{}:",
                match source {
                    KeywordSource::Popular => "Popular",
                    KeywordSource::Matching => "Suggestions",
                }
            );
            for item in items {
                println!("  {}", emphasize(item));
            }
        }
        SuggestionGroup::RecentKeywords(items) => {
            println!("Recent keywords:");
            for item in items {
                println!("  {}", emphasize(item));
            }
        }
    }
}

fn print_event(detail: &EventDetail) {
    println!("{}", detail.name);
    if !detail.date.is_empty() {
        println!("  Date:       {}", detail.date);
    }
    if !detail.artists.is_empty() {
        println!("  Artists:    {}", detail.artist_line());
    }
    if let Some(venue) = &detail.venue {
        println!("  Venue:      {venue}");
    }
    if !detail.genres.is_empty() {
        println!("  Genres:     {}", detail.genres);
    }
    if let Some(price) = &detail.price_range {
        println!("  Price:      {price}");
    }
    if let Some(status) = &detail.ticket_status {
        println!("  Tickets:    {}", status.label());
    }
    if let Some(url) = &detail.buy_url {
        println!("  Buy:        {url}");
    }
    if let Some(url) = &detail.seat_map_url {
        println!("  Seat map:   {url}");
    }
}

fn print_venue(venue: &VenueDetail) {
    println!("{}", venue.name);
    println!("  Address:    {}", venue.address);
    println!("  City:       {}", venue.city_state);
    println!("  Postal:     {}", venue.postal_code);
    if let Some(url) = &venue.upcoming_events_url {
        println!("  Upcoming:   {url}");
    }
    println!("  Map:        {}", venue.maps_url);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(keyword: &str, ranges: &[(usize, usize)]) -> KeywordSuggestion {
        KeywordSuggestion {
            keyword: keyword.to_string(),
            highlight_ranges: ranges.to_vec(),
        }
    }

    #[test]
    fn emphasize_brackets_each_run() {
        assert_eq!(emphasize(&suggestion("Taylor Swift", &[(0, 3)])), "[Tay]lor Swift");
        assert_eq!(emphasize(&suggestion("Café Tacuba", &[(3, 4), (5, 7)])), "Caf[é] [Ta]cuba");
        assert_eq!(emphasize(&suggestion("Jazz", &[])), "Jazz");
    }

    #[test]
    fn recent_line_names_the_category() {
        let params = gigsearch::SearchParams::new("jazz", "25", "KZFzniwnSyZfZ7v7nJ", "Chicago, IL");
        let entry = RecentSearch::from_params(&params, 0);
        assert_eq!(
            recent_line(&entry, 60_000),
            "jazz · Chicago, IL · Music · 25 mi · 1m ago"
        );
    }
}
