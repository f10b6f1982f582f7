mod config;
mod db;
mod error;
mod export;
mod ingest;
mod normalize;
mod parser;
mod sources;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use db::MergePolicy;
use normalize::Normalizer;
use sources::{JobSource, JsonFileSource};

#[derive(Parser)]
#[command(name = "job_ingest", about = "Normalize scraped job postings into a deduplicated store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the jobs table
    Init,
    /// Load scraper output, normalize it and upsert by URL
    Ingest {
        /// Source names to load from <output_dir>/<name>/<name>_jobs.json (default: seek, jobsearch)
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// How a re-scraped job merges into the stored one
        #[arg(long, value_enum, default_value_t = MergePolicy::Overwrite)]
        merge: MergePolicy,
    },
    /// Write every stored job to a CSV file
    Export {
        #[arg(short, long, default_value = "combined_jobs.csv")]
        out: PathBuf,
    },
    /// Show store statistics
    Stats,
    /// Drop the jobs table
    Reset,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = config::Settings::load()?;
    let conn = db::connect(&settings.database_url)?;

    let result = match cli.command {
        Commands::Init => {
            db::init_schema(&conn)?;
            println!("Schema ready at {}", settings.database_url);
            Ok(())
        }
        Commands::Ingest { sources, merge } => {
            db::init_schema(&conn)?;
            let names: Vec<String> = if sources.is_empty() {
                sources::DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
            } else {
                sources
            };
            let sources: Vec<Box<dyn JobSource>> = names
                .iter()
                .map(|name| {
                    let src = JsonFileSource::in_output_dir(&settings.output_dir, name);
                    println!("Source {}: {:?}", name, src.path());
                    Box::new(src) as Box<dyn JobSource>
                })
                .collect();

            let raws = sources::fetch_all(&sources);
            if raws.is_empty() {
                println!("No jobs found to ingest.");
                return Ok(());
            }

            let now = chrono::Local::now().naive_local();
            let normalizer = Normalizer::new(now).with_country(&settings.default_country);

            println!("Ingesting {} jobs...", raws.len());
            let pb = ProgressBar::new(raws.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
                    .progress_chars("#>-"),
            );
            let report = ingest::ingest_batch(&conn, &raws, &normalizer, merge, &pb);
            pb.finish_and_clear();

            let report = report.context("Ingestion failed; no changes were committed")?;
            report.print();
            Ok(())
        }
        Commands::Export { out } => {
            db::init_schema(&conn)?;
            let jobs = db::fetch_all(&conn)?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("Failed to create {:?}", out))?;
            let n = export::write_csv(std::io::BufWriter::new(file), &jobs)?;
            println!("Wrote {} jobs to {:?} ({} columns)", n, out, export::COLUMNS.len());
            Ok(())
        }
        Commands::Stats => {
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Total:       {}", s.total);
            println!("With salary: {}", s.with_salary);
            println!("With date:   {}", s.with_posted_date);
            println!("Remote:      {}", s.remote);
            println!("Hybrid:      {}", s.hybrid);
            if !s.by_source.is_empty() {
                println!("\n--- By source ---");
                for (source, n) in &s.by_source {
                    println!("  {:<12} {}", source, n);
                }
            }
            Ok(())
        }
        Commands::Reset => {
            db::reset(&conn)?;
            println!("Dropped jobs table.");
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
