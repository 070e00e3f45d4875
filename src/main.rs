use clap::{Parser, ValueEnum};
use congress_roster::config::Config;
use congress_roster::infra::http_client::ReqwestHttp;
use congress_roster::logging;
use congress_roster::pipeline::{FeedSource, Pipeline, RunPlan};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "congress_roster")]
#[command(about = "Flatten the U.S. House and Senate roster feeds into CSV tables")]
#[command(version)]
struct Cli {
    /// Directory that receives the house/ and senate/ tables
    output_dir: PathBuf,

    /// Which chamber to process
    #[arg(long, value_enum, default_value_t = ChamberSelection::All)]
    chamber: ChamberSelection,

    /// TOML config file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the House feed from a saved file instead of fetching it
    #[arg(long)]
    house_xml: Option<PathBuf>,

    /// Read the Senate feed from a saved file instead of fetching it
    #[arg(long)]
    senate_xml: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ChamberSelection {
    House,
    Senate,
    All,
}

impl ChamberSelection {
    fn includes_house(self) -> bool {
        matches!(self, ChamberSelection::House | ChamberSelection::All)
    }

    fn includes_senate(self) -> bool {
        matches!(self, ChamberSelection::Senate | ChamberSelection::All)
    }
}

fn build_plan(cli: &Cli, config: &Config) -> RunPlan {
    let source = |file: &Option<PathBuf>, url: &str| match file {
        Some(path) => FeedSource::File(path.clone()),
        None => FeedSource::Remote(url.to_string()),
    };
    RunPlan {
        house: cli
            .chamber
            .includes_house()
            .then(|| source(&cli.house_xml, &config.feeds.house_url)),
        senate: cli
            .chamber
            .includes_senate()
            .then(|| source(&cli.senate_xml, &config.feeds.senate_url)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = logging::init_logging();

    let config = Config::load(cli.config.as_deref())?;
    let plan = build_plan(&cli, &config);
    let http = ReqwestHttp::new(config.http.clone())?;
    let retrieved_at = chrono::Local::now().naive_local();

    println!("🚀 Writing roster tables to {}", cli.output_dir.display());
    info!(?plan, output_dir = %cli.output_dir.display(), "Starting run");

    let results = match Pipeline::run(&plan, &http, &cli.output_dir, retrieved_at).await {
        Ok(results) => results,
        Err(e) => {
            error!("Run failed: {}", e);
            println!("❌ Run failed: {}", e);
            return Err(e.into());
        }
    };

    for result in &results {
        println!("\n📊 {} ({})", result.chamber, result.source);
        println!("   Payload: {} bytes, sha256 {}", result.payload_bytes, result.payload_sha256);
        for table in &result.tables {
            println!("   {} rows -> {}", table.rows, table.path.display());
        }
        println!("   Total rows: {}", result.total_rows());
    }
    println!("\n✅ Run completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_dir_is_required() {
        let err = Cli::try_parse_from(["congress_roster"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn plan_follows_chamber_and_file_overrides() {
        let cli = Cli::try_parse_from([
            "congress_roster",
            "out",
            "--chamber",
            "senate",
            "--senate-xml",
            "saved/senate.xml",
        ])
        .unwrap();
        let plan = build_plan(&cli, &Config::default());
        assert!(plan.house.is_none());
        assert_eq!(
            plan.senate,
            Some(FeedSource::File(PathBuf::from("saved/senate.xml")))
        );

        let cli = Cli::try_parse_from(["congress_roster", "out"]).unwrap();
        let plan = build_plan(&cli, &Config::default());
        assert_eq!(
            plan.house,
            Some(FeedSource::Remote(
                congress_roster::constants::HOUSE_FEED_URL.to_string()
            ))
        );
        assert!(plan.senate.is_some());
    }
}
