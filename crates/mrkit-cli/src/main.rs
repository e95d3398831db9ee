//! mrkit CLI: job history reports, spec checks, and local job runs.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mrkit_core::{HistoryConfig, InputSpec, JobId, OutputFormat, OutputSpec};
use mrkit_exec::{apply_job_config, parse_yaml_job, JobRunner, LocalEngine, Registry, RunContext};
use mrkit_history::{HistoryError, JobHistoryReporter, JobHistoryStore, ReportOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mrkit")]
#[command(about = "Batch job output specs and job execution history", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the recorded history of one job, or of every job
    JobHistory {
        /// Storage instance URI (overrides MRKIT_STORE_URI)
        #[arg(long)]
        store: Option<String>,

        /// History table name (overrides MRKIT_HISTORY_TABLE)
        #[arg(long)]
        table: Option<String>,

        /// Only report this job
        #[arg(long)]
        job_id: Option<String>,

        /// Include job counters
        #[arg(long)]
        counters: bool,

        /// Include the job configuration
        #[arg(long)]
        configuration: bool,

        /// Include extension fields
        #[arg(long)]
        extensions: bool,
    },

    /// Create the job history table if it does not exist
    InstallHistory {
        #[arg(long)]
        store: Option<String>,

        #[arg(long)]
        table: Option<String>,
    },

    /// Parse an output spec (format:location@splits)
    CheckOutput {
        #[arg(long)]
        spec: String,
    },

    /// Parse an input spec (format:location[,location...])
    CheckInput {
        #[arg(long)]
        spec: String,
    },

    /// Run a job described by a YAML file
    Run {
        /// Path to the job YAML file
        #[arg(short, long)]
        job: PathBuf,

        /// Storage instance URI for the history table
        #[arg(long)]
        store: Option<String>,

        /// Do not record the job in the history table
        #[arg(long)]
        no_history: bool,

        /// Give up waiting for the job after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::JobHistory {
            store,
            table,
            job_id,
            counters,
            configuration,
            extensions,
        } => {
            let cfg = history_config(store, table);
            let options = ReportOptions {
                counters,
                configuration,
                extensions,
            };
            if let Err(e) = job_history(&cfg, job_id.as_deref(), options) {
                eprintln!("Error: {}", e);
                std::process::exit(history_exit_code(&e));
            }
        }
        Commands::InstallHistory { store, table } => {
            let cfg = history_config(store, table);
            match install_history(&cfg) {
                Ok(true) => println!("✓ Installed table '{}'", cfg.table_name),
                Ok(false) => println!("✓ Table '{}' already installed", cfg.table_name),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(history_exit_code(&e));
                }
            }
        }
        Commands::CheckOutput { spec } => match OutputSpec::parse(&spec) {
            Ok(parsed) => print!("{}", describe_output(&parsed)),
            Err(e) => {
                eprintln!("Invalid output spec: {}", e);
                std::process::exit(1);
            }
        },
        Commands::CheckInput { spec } => match InputSpec::parse(&spec) {
            Ok(parsed) => print!("{}", describe_input(&parsed)),
            Err(e) => {
                eprintln!("Invalid input spec: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Run {
            job,
            store,
            no_history,
            timeout_ms,
        } => match run_job(&job, store, no_history, timeout_ms) {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    }
}

/// Environment defaults with command-line overrides applied.
fn history_config(store: Option<String>, table: Option<String>) -> HistoryConfig {
    let mut cfg = HistoryConfig::from_env();
    if let Some(uri) = store {
        cfg.store_uri = Some(uri);
    }
    if let Some(table) = table {
        cfg.table_name = table;
    }
    cfg
}

fn history_exit_code(e: &HistoryError) -> i32 {
    if e.is_not_found() {
        1
    } else {
        2
    }
}

fn open_instance(cfg: &HistoryConfig) -> Result<Arc<dyn mrkit_store::StorageInstance>, HistoryError> {
    let uri = cfg.store_uri.as_deref().ok_or_else(|| {
        HistoryError::StorageUnavailable("no storage instance given (use --store or MRKIT_STORE_URI)".into())
    })?;
    Ok(mrkit_store::open_instance(uri)?)
}

fn job_history(
    cfg: &HistoryConfig,
    job_id: Option<&str>,
    options: ReportOptions,
) -> Result<(), HistoryError> {
    let store = JobHistoryStore::open(open_instance(cfg)?, cfg)?;
    let reporter = JobHistoryReporter::new(&store).with_options(options);
    let text = match job_id {
        Some(id) => reporter.report(&JobId::from(id))?,
        None => reporter.report_all()?,
    };
    print!("{}", text);
    Ok(())
}

fn install_history(cfg: &HistoryConfig) -> Result<bool, HistoryError> {
    let instance = open_instance(cfg)?;
    JobHistoryStore::install(instance.as_ref(), &cfg.table_name)
}

fn describe_output(spec: &OutputSpec) -> String {
    let mut out = format!(
        "format:   {}\nlocation: {}\nsplits:   {}\n",
        spec.format(),
        spec.location(),
        spec.splits()
    );
    if spec.format() == OutputFormat::HFile {
        if let Some((table, path)) = spec.hfile_locations() {
            if let Some(table) = table {
                out.push_str(&format!("table:    {}\n", table));
            }
            out.push_str(&format!("path:     {}\n", path));
        }
    }
    out
}

fn describe_input(spec: &InputSpec) -> String {
    let mut out = format!("format:   {}\n", spec.format());
    for location in spec.locations() {
        out.push_str(&format!("location: {}\n", location));
    }
    out
}

/// Returns whether the job succeeded.
fn run_job(
    job_path: &Path,
    store: Option<String>,
    no_history: bool,
    timeout_ms: Option<u64>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(job_path)?;
    let parsed = parse_yaml_job(&yaml_content)?;

    // env < job file < flags
    let mut config = HistoryConfig::from_env();
    apply_job_config(&mut config, &parsed.config);
    if let Some(uri) = store {
        config.store_uri = Some(uri);
    }
    if no_history {
        config.enabled = false;
    }
    if let Some(ms) = timeout_ms {
        config.wait_timeout_ms = ms;
    }

    let job = parsed.job.prepare(&Registry::builtin())?;
    tracing::debug!(job = %job.name, store = ?config.store_uri, history = config.enabled, "running job file");
    let ctx = RunContext::from_config(config);
    let runner = JobRunner::new(Arc::new(LocalEngine::new()), ctx);

    let submitted = runner.submit(job)?;
    let outcome = submitted.wait(runner.context().wait_timeout())?;

    if outcome.is_successful() {
        println!("✓ Job {} succeeded", submitted.job_id());
    } else {
        println!(
            "✗ Job {} failed: {}",
            submitted.job_id(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    for (name, value) in outcome.counters.iter() {
        println!("  {}={}", name, value);
    }
    Ok(outcome.is_successful())
}
