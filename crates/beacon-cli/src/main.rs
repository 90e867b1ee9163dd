use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use beacon_core::PlanTier;
use beacon_scanner::{run_scan, MemoryScanStore, ScanDeps, ScanRequest, ScanStore};

#[derive(Debug, Parser)]
#[command(name = "beacon")]
#[command(about = "AI visibility scanner command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a one-shot scan for a product profile and print the result.
    Scan {
        /// Path to a ProductProfile YAML file.
        #[arg(long)]
        profile: PathBuf,

        /// Brand id used for competitor history grouping.
        #[arg(long, default_value_t = 0)]
        brand_id: i64,

        /// Plan tier to apply (free, starter, pro, agency).
        #[arg(long, default_value = "pro")]
        tier: String,

        /// Extra questions to validate alongside the generated ones.
        #[arg(long = "question")]
        questions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            profile,
            brand_id,
            tier,
            questions,
        } => scan(profile, brand_id, &tier, questions).await,
    }
}

async fn scan(
    profile_path: PathBuf,
    brand_id: i64,
    tier: &str,
    questions: Vec<String>,
) -> anyhow::Result<()> {
    let config = beacon_core::load_app_config()?;
    let profile = beacon_core::load_profile(&profile_path)?;

    let providers = beacon_providers::build_providers(&config)?;
    anyhow::ensure!(
        !providers.is_empty(),
        "no AI provider API keys configured; set at least one of \
         OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY"
    );

    // One-shot mode: everything stays in memory, nothing touches Postgres.
    let store = Arc::new(MemoryScanStore::new());
    let deps = ScanDeps {
        store: Arc::clone(&store) as Arc<dyn ScanStore>,
        providers,
        provider_timeout: Duration::from_secs(config.provider_request_timeout_secs),
    };

    let request = ScanRequest {
        scan_id: Uuid::new_v4(),
        brand_id,
        profile,
        tier: PlanTier::parse(tier),
        explicit_questions: questions,
    };
    store
        .create_scan(request.scan_id, brand_id, &request.profile.brand_name)
        .await?;

    let result = run_scan(&deps, &request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
