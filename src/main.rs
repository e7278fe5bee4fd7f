use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tvmaze_agent::{
    AgentConfig, MediaShow, MetadataProvider, SchemeToken, SearchCandidate, ShowMetadata,
    TvMazeAgent, classify,
};

/// Run the TVMaze metadata agent by hand
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TVMaze API endpoint
    #[arg(long, global = true, default_value = tvmaze_agent::DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search shows by name and print ranked candidates
    Search {
        name: String,
        /// Language for candidates without a known language
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// Print the episode scheme detected in each file name
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fetch metadata for a show and the given episode files, print it as JSON
    Update {
        /// TVMaze show id
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "en")]
        lang: String,
    },
    /// List all episodes of a show
    Episodes {
        /// TVMaze show id
        id: u64,
    },
}

/// Builds the host-side media tree from file names.
///
/// Date based files are filed under season = year, episode = MMDD.
fn media_from_files(files: &[PathBuf]) -> MediaShow {
    let mut media = MediaShow::new("");

    for file in files {
        let name = file.to_string_lossy();
        match classify(&name) {
            Some(SchemeToken::Numeric { season, episode }) => {
                media.add_episode_file(season, episode, file);
            }
            Some(SchemeToken::Date(date)) => {
                use chrono::Datelike;
                let year = u32::try_from(date.year()).unwrap_or_default();
                media.add_episode_file(year, date.month() * 100 + date.day(), file);
            }
            None => eprintln!("Skipping {}: no episode scheme found", file.display()),
        }
    }

    media
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AgentConfig::default()
        .with_base_url(cli.base_url)
        .with_timeout(Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Command::Search { name, lang } => {
            let agent = TvMazeAgent::with_config(&config)?;
            let mut results: Vec<SearchCandidate> = Vec::new();
            agent.search(&mut results, &MediaShow::new(name), &lang, true);

            if results.is_empty() {
                println!("No shows found.");
            }
            for candidate in results {
                println!(
                    "{:>3}  {:<8} {} ({}) [{}]",
                    candidate.score,
                    candidate.id,
                    candidate.name,
                    candidate
                        .year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "----".to_string()),
                    candidate.lang
                );
            }
        }
        Command::Classify { files } => {
            for file in files {
                match classify(&file.to_string_lossy()) {
                    Some(token @ SchemeToken::Numeric { .. }) => {
                        println!("{}: number {}", file.display(), token)
                    }
                    Some(SchemeToken::Date(date)) => println!("{}: date {}", file.display(), date),
                    None => println!("{}: none", file.display()),
                }
            }
        }
        Command::Update { id, files, lang } => {
            let agent = TvMazeAgent::with_config(&config)?;
            let media = media_from_files(&files);
            let mut metadata = ShowMetadata::new(id);

            let report = agent.update(&mut metadata, &media, &lang, true)?;

            println!("{}", serde_json::to_string_pretty(&metadata)?);
            eprintln!(
                "Updated {} episode(s), {} unresolved, {} missing field(s)",
                report.updated_episodes.len(),
                report.unresolved_episodes.len(),
                report.missing_fields.len()
            );
        }
        Command::Episodes { id } => {
            let agent = TvMazeAgent::with_config(&config)?;
            for episode in agent.provider().episodes(id)? {
                println!(
                    "S{:02}E{:02}  {}  {}",
                    episode.season,
                    episode.number.unwrap_or_default(),
                    episode.airdate.as_deref().unwrap_or("----------"),
                    episode.name.as_deref().unwrap_or("Unknown")
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
