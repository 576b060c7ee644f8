mod menu;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use catalogue::{Catalogue, MovieRecord};
use engine::RecommendationEngine;
use session::{BrowseMode, Session};
#[cfg(feature = "sentence-embeddings")]
use similarity::SentenceEmbeddingProvider;
use similarity::{SimilarityProvider, TermVectorProvider};

use crate::menu::Menu;

/// Home Cinema - browse, search and get recommendations from a movie catalogue
#[derive(Parser)]
#[command(name = "home-cinema")]
#[command(about = "Movie catalogue with content-based recommendations", long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "movies.db")]
    database: PathBuf,

    /// CSV catalogue to load at startup (skipped if the file is missing)
    #[arg(long, default_value = "data/moviedb.csv")]
    catalogue: PathBuf,

    /// Similarity backend used to rank recommendations
    #[arg(long, value_enum, default_value = "sentence")]
    provider: ProviderArg,

    /// Dimensions of the term vectors (term-vector provider only)
    #[arg(long, default_value = "512")]
    dimensions: usize,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Search titles, directors and tags
    Search {
        /// Keywords to search for
        #[arg(long)]
        query: String,
    },

    /// List the catalogue in one of the browse orders
    Browse {
        #[arg(long, value_enum)]
        by: BrowseArg,
    },

    /// Recommend movies for a played movie
    Recommend {
        /// Identifier of the played movie
        #[arg(long)]
        id: String,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Time recommendations for randomly chosen movies
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    /// Pretrained sentence embeddings (semantic, downloads a model on first run)
    Sentence,
    /// Hashed term vectors (lexical, offline)
    TermVector,
}

#[derive(Clone, Copy, ValueEnum)]
enum BrowseArg {
    Genre,
    Director,
    NewReleases,
}

impl From<BrowseArg> for BrowseMode {
    fn from(arg: BrowseArg) -> Self {
        match arg {
            BrowseArg::Genre => BrowseMode::Genre,
            BrowseArg::Director => BrowseMode::Director,
            BrowseArg::NewReleases => BrowseMode::NewReleases,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so they don't interleave with the menu
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let provider_kind = cli.provider;
    match provider_kind {
        ProviderArg::TermVector => {
            let provider = TermVectorProvider::new().with_dimensions(cli.dimensions);
            run(cli, Arc::new(provider)).await
        }
        #[cfg(feature = "sentence-embeddings")]
        ProviderArg::Sentence => {
            let start = Instant::now();
            match SentenceEmbeddingProvider::new() {
                Ok(provider) => {
                    info!("Sentence embedding model ready in {:?}", start.elapsed());
                    run(cli, Arc::new(provider)).await
                }
                Err(e) => {
                    warn!("Sentence embedding model failed to load ({}). Falling back to term vectors.", e);
                    let provider = TermVectorProvider::new().with_dimensions(cli.dimensions);
                    run(cli, Arc::new(provider)).await
                }
            }
        }
        #[cfg(not(feature = "sentence-embeddings"))]
        ProviderArg::Sentence => {
            bail!("Built without sentence embeddings; pass --provider term-vector")
        }
    }
}

/// Open the catalogue, run one command against it and close it
async fn run<P: SimilarityProvider + 'static>(cli: Cli, provider: Arc<P>) -> Result<()> {
    let catalogue = Catalogue::open(&cli.database)
        .await
        .with_context(|| format!("Failed to open database {}", cli.database.display()))?;

    if cli.catalogue.exists() {
        let start = Instant::now();
        let loaded = catalogue
            .load_csv(&cli.catalogue)
            .await
            .with_context(|| format!("Failed to load catalogue {}", cli.catalogue.display()))?;
        info!("Loaded {} movies in {:?}", loaded, start.elapsed());
    } else if catalogue.count().await? == 0 {
        warn!(
            "Catalogue {} not found and database is empty",
            cli.catalogue.display()
        );
    }

    let session = Session::new(catalogue, RecommendationEngine::new(provider));

    let outcome = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => handle_menu(&session).await,
        Commands::Search { query } => handle_search(&session, &query).await,
        Commands::Browse { by } => handle_browse(&session, by.into()).await,
        Commands::Recommend { id, json } => handle_recommend(&session, &id, json).await,
        Commands::Benchmark { requests } => handle_benchmark(&session, requests).await,
    };

    session.close().await;
    outcome
}

/// Handle the 'menu' command
async fn handle_menu<P: SimilarityProvider + 'static>(session: &Session<P>) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(session, stdin.lock(), stdout.lock()).run().await
}

/// Handle the 'search' command
async fn handle_search<P: SimilarityProvider + 'static>(
    session: &Session<P>,
    query: &str,
) -> Result<()> {
    let movies = session.search(query).await?;
    if movies.is_empty() {
        println!("Your search returned 0 results.");
        return Ok(());
    }
    println!(
        "{}",
        format!("Your search returned {} result(s):", movies.len()).bold().blue()
    );
    print_movies(&movies, |m| &m.genre);
    Ok(())
}

/// Handle the 'browse' command
async fn handle_browse<P: SimilarityProvider + 'static>(
    session: &Session<P>,
    mode: BrowseMode,
) -> Result<()> {
    let movies = session.browse(mode).await?;
    match mode {
        BrowseMode::Director => print_movies(&movies, |m| &m.director),
        BrowseMode::Genre | BrowseMode::NewReleases => print_movies(&movies, |m| &m.genre),
    }
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend<P: SimilarityProvider + 'static>(
    session: &Session<P>,
    id: &str,
    json: bool,
) -> Result<()> {
    let movie = session.movie(id).await?;
    let recommendations = session.play(&movie).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Did you enjoy {}? You might also like:", movie.title).bold().blue()
    );
    print_movies(&recommendations, |m| &m.genre);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark<P: SimilarityProvider + 'static>(
    session: &Session<P>,
    requests: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }
    let movies = session.catalogue().fetch_all().await?;
    if movies.is_empty() {
        bail!("Catalogue is empty, nothing to benchmark");
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let wall = Instant::now();
    for _ in 0..requests {
        let movie = &movies[rand::random::<u32>() as usize % movies.len()];
        let start = Instant::now();
        session.play(movie).await?;
        timings.push(start.elapsed());
    }
    let total_time = wall.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Catalogue size: {}", movies.len());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Numbered listing with a second line chosen by the caller
fn print_movies<F>(movies: &[MovieRecord], second_line: F)
where
    F: Fn(&MovieRecord) -> &String,
{
    for (rank, movie) in movies.iter().enumerate() {
        println!(
            "{} {} ({})\n{}\n",
            (rank + 1).to_string().green(),
            movie.title,
            movie.year,
            second_line(movie)
        );
    }
}
