use anyhow::{Context, Result};
use athlete_resolver::AthleteRecord;
use athlete_resolver::config::Config;
use athlete_resolver::pipeline::AthleteResolutionPipeline;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Look up athlete names across localized profile pages and determine nationality.
#[derive(Parser, Debug)]
#[command(name = "athlete-resolver", version, about)]
struct Cli {
    /// Athlete names or profile URLs; several are resolved as a batch.
    #[arg(required = true)]
    queries: Vec<String>,

    /// Path to the JSON config file.
    #[arg(short, long, default_value = "")]
    config: String,

    /// Print results as a JSON array.
    #[arg(long)]
    json: bool,

    /// API key for the search strategy (overrides the config file).
    #[arg(long)]
    search_api_key: Option<String>,

    /// Do not pause between batch queries.
    #[arg(long)]
    no_delay: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1. Load config
    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    if let Some(key) = cli.search_api_key {
        config.search.api_key = key;
    }
    if cli.no_delay {
        config.batch_delay_ms = 0;
    }

    // 2. Build pipeline
    let pipeline =
        AthleteResolutionPipeline::from_config(&config).context("Invalid configuration")?;

    // 3. Resolve
    let progress = ProgressBar::new(cli.queries.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let records = pipeline.resolve_batch_with(&cli.queries, |record| {
        progress.set_message(record.query.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();

    // 4. Output
    if cli.json {
        let out = serde_json::to_string_pretty(&records).context("Failed to serialize results")?;
        println!("{out}");
    } else {
        for record in &records {
            print_record(record, &config);
        }
    }

    Ok(())
}

fn print_record(record: &AthleteRecord, config: &Config) {
    println!("Query:       {}", record.query);
    println!("Status:      {:?}", record.status);
    println!("Profile:     {}", record.profile_url);
    println!("Nickname:    {}", record.nickname);
    match record.nationality_source {
        Some(source) => println!("Nationality: {} ({})", record.nationality, source.as_str()),
        None => println!("Nationality: {}", record.nationality),
    }
    for name in &record.names {
        let label = config
            .locale(&name.locale)
            .map(|l| l.label.as_str())
            .filter(|l| !l.is_empty())
            .unwrap_or(name.locale.as_str());
        println!("  {label:<10} {}", name.display_name);
    }
    println!();
}
