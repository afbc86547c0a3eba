//! Paybench Ingest - batch data loading jobs

use clap::{Parser, Subcommand};
use paybench_common::logging::{init_logging, LogConfig, LogLevel};
use paybench_ingest::bls::{BlsClient, BlsPipeline, PgWageStore};
use paybench_ingest::config::{BlsConfig, CsvConfig};
use paybench_ingest::csv_ingest::{CsvIngestion, PgRosterStore};
use paybench_ingest::db::{create_pool, DbConfig};
use paybench_ingest::run_log::PgRunLogStore;
use paybench_ingest::seed::{PgReferenceStore, SeedPipeline};
use sqlx::PgPool;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "paybench-ingest")]
#[command(author, version, about = "Paybench data loading jobs")]
struct Cli {
    #[command(subcommand)]
    job: Job,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Job {
    /// Pull OEWS wage data from the BLS API into bls_wage_data
    Bls {
        /// Survey year to request (overrides BLS_SURVEY_YEAR)
        #[arg(long)]
        survey_year: Option<i32>,
    },

    /// Load the employee roster and job grades from CSV
    Csv {
        /// Directory holding the CSV files
        #[arg(long, env = "DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Seed soc_code_reference and job_soc_crosswalk
    Seed,
}

impl Job {
    fn log_prefix(&self) -> &'static str {
        match self {
            Job::Bls { .. } => "bls_pipeline",
            Job::Csv { .. } => "csv_ingestion",
            Job::Seed => "seed_reference_data",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut log_config = match LogConfig::for_job(cli.job.log_prefix()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid logging configuration: {}", e);
            return ExitCode::FAILURE;
        },
    };
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        },
    };

    match run(cli.job).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Job aborted");
            ExitCode::FAILURE
        },
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config = DbConfig::from_env()?;
    let pool = create_pool(&config).await?;
    info!("Connected to database");
    Ok(pool)
}

/// Run one job; `Ok(false)` means the job ran and recorded a failure
async fn run(job: Job) -> anyhow::Result<bool> {
    match job {
        Job::Bls { survey_year } => {
            let mut config = BlsConfig::from_env()?;
            if let Some(year) = survey_year {
                config = config.with_survey_year(year);
            }
            config.validate()?;

            let client = BlsClient::new(&config)?;
            let pool = connect().await?;
            let pipeline = BlsPipeline::new(
                config,
                PgWageStore::new(pool.clone()),
                client,
                PgRunLogStore::new(pool),
            );
            Ok(pipeline.run().await.is_success())
        },
        Job::Csv { data_dir } => {
            let mut config = CsvConfig::from_env();
            if let Some(dir) = data_dir {
                config = config.with_data_dir(dir);
            }

            let pool = connect().await?;
            let ingestion =
                CsvIngestion::new(config, PgRosterStore::new(pool.clone()), PgRunLogStore::new(pool));
            Ok(ingestion.run().await.is_success())
        },
        Job::Seed => {
            let pool = connect().await?;
            let pipeline =
                SeedPipeline::new(PgReferenceStore::new(pool.clone()), PgRunLogStore::new(pool))?;
            Ok(pipeline.run().await.is_success())
        },
    }
}
