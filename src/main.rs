mod batch;
mod config;
mod error;
mod fetch;
mod input;
mod model;
mod parser;
mod resolver;
mod workbook;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use config::{Endpoints, FetchSettings, Settings};
use fetch::HttpFetcher;
use model::{JobSpec, JobStatus};
use resolver::Resolver;

#[derive(Parser)]
#[command(name = "dock_summary", about = "Compile HDOCK Top-10 tables into one spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FetchArgs {
    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = config::TIMEOUT_SECS)]
    timeout_secs: u64,
    /// User-Agent header sent with every request
    #[arg(long, default_value = config::USER_AGENT)]
    user_agent: String,
    /// Extra plaintext file names to try after ranked_poses.txt (e.g. ranked.txt)
    #[arg(long = "plaintext-name")]
    plaintext_names: Vec<String>,
    /// Extra result pages to try after the base URL (e.g. result.html)
    #[arg(long = "html-name")]
    html_names: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every job in the list and write the workbook
    Compile {
        /// Job list: `<complex_id> <base_url>` per line
        #[arg(short, long, default_value = config::DEFAULT_INPUT)]
        input: PathBuf,
        /// Output workbook (.xlsx)
        #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
        output: PathBuf,
        /// Also dump the collected results as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Pause between jobs, in milliseconds
        #[arg(long, default_value_t = config::DELAY_MS)]
        delay_ms: u64,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Resolve a single job and print its table
    Inspect {
        complex_id: String,
        base_url: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Validate a job list without touching the network
    Check {
        #[arg(short, long, default_value = config::DEFAULT_INPUT)]
        input: PathBuf,
    },
}

impl FetchArgs {
    fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            endpoints: Endpoints::default().with_extra(&self.plaintext_names, &self.html_names),
        }
    }
}

fn build_resolver(settings: &FetchSettings) -> anyhow::Result<Resolver<HttpFetcher>> {
    let fetcher = HttpFetcher::new(&settings.user_agent, settings.timeout)?;
    Ok(Resolver::new(fetcher, settings.endpoints.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            json,
            delay_ms,
            fetch,
        } => {
            let settings = Settings {
                input,
                output,
                json,
                delay: Duration::from_millis(delay_ms),
                fetch: fetch.fetch_settings(),
            };
            compile(&settings).await
        }
        Commands::Inspect {
            complex_id,
            base_url,
            fetch,
        } => inspect(&fetch.fetch_settings(), JobSpec::new(complex_id, &base_url)).await,
        Commands::Check { input } => {
            let jobs = input::load_jobs(&input)?;
            for job in &jobs {
                println!("{:<16} {}", job.complex_id, job.base_url);
            }
            println!("\n{} jobs", jobs.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn compile(settings: &Settings) -> anyhow::Result<()> {
    let jobs = input::load_jobs(&settings.input)?;
    if jobs.is_empty() {
        tracing::warn!("{} contains no jobs", settings.input.display());
    }
    println!("Compiling {} jobs from {}...", jobs.len(), settings.input.display());

    let resolver = build_resolver(&settings.fetch)?;
    let model = batch::run_batch(&resolver, &jobs, settings.delay).await;

    workbook::write_xlsx(&workbook::render(&model), &settings.output)?;
    if let Some(path) = &settings.json {
        workbook::write_json(&model, path)?;
    }

    println!(
        "Workbook -> {} ({} ok, {} failed)",
        settings.output.display(),
        model.succeeded(),
        model.failed()
    );
    Ok(())
}

async fn inspect(settings: &FetchSettings, job: JobSpec) -> anyhow::Result<()> {
    let result = build_resolver(settings)?.resolve(&job).await;

    println!("{}", job.complex_id);
    if let JobStatus::Failure { reason } = &result.status {
        println!("Failed: {}", reason);
        return Ok(());
    }

    println!(
        "{:>4} | {:>13} | {:>16} | {:>11} | {}",
        "Rank", "Docking Score", "Confidence Score", "Ligand RMSD", "Interface residues"
    );
    println!("{}", "-".repeat(78));
    for r in &result.rows {
        println!(
            "{:>4} | {:>13.2} | {:>16.4} | {:>11.2} | {}",
            r.rank, r.docking_score, r.confidence_score, r.ligand_rmsd, r.interface_residues
        );
    }
    if let Some(link) = &result.archive_link {
        println!("\nAll results package: {}", link);
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
