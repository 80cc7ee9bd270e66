use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use cinesphere_lib::{build_recommender, AppConfig, EnrichmentResult};

#[derive(Parser)]
#[command(name = "cinesphere")]
#[command(about = "Find movies similar to one you like", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.cinesphere/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the catalog artifact path
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Override the similarity artifact path
    #[arg(long, global = true)]
    similarity: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend titles similar to TITLE
    Recommend {
        title: String,

        /// Number of recommendations (defaults to the configured top-k)
        #[arg(short)]
        k: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog titles
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn print_results(title: &str, results: &[EnrichmentResult]) {
    if results.is_empty() {
        println!("No recommendations for '{}'.", title);
        return;
    }

    println!("Because you liked '{}':", title);
    for (rank, result) in results.iter().enumerate() {
        println!("{:>2}. {}", rank + 1, result.title);
        println!("    details: {}", result.detail_link.as_deref().unwrap_or("not found"));
        println!("    poster:  {}", result.image_ref.as_deref().unwrap_or("Poster not found"));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut config = AppConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow!(e.user_message()))
        .context("failed to load configuration")?;
    if let Some(catalog) = &cli.catalog {
        config.artifacts.catalog_path = catalog.clone();
    }
    if let Some(similarity) = &cli.similarity {
        config.artifacts.similarity_path = similarity.clone();
    }

    let recommender = build_recommender(&config)
        .map_err(|e| anyhow!(e.user_message()))
        .context("failed to load recommendation data")?;

    match cli.command {
        Commands::Recommend { title, k, json } => {
            let k = k.unwrap_or_else(|| config.top_k());
            let results = recommender.recommend(&title, k).await;
            recommender.enricher().shutdown();

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&title, &results);
            }
        }
        Commands::List { limit } => {
            let catalog = recommender.index().catalog();
            for title in catalog.titles().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", title);
            }
        }
    }

    Ok(())
}
