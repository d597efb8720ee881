use anyhow::Context;
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use vsn_core::Config;
use vsn_inference::create_generator;
use vsn_scrapers::scheduler::format_duration;
use vsn_scrapers::{
    handle_command, init_logging, HttpFetcher, IngestManager, ScraperArgs, ScraperCommands,
    Scheduler, SourceRegistry,
};
use vsn_storage::{create_storage, StorageKind};
use vsn_web::{create_app, AppState};

/// `--interval` value: `6h`, `1h30m`, `45s`, `1d`, or a bare number of seconds.
#[derive(Debug, Clone)]
struct HumanDuration(Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if input.is_empty() {
            return Err("Duration must include a number".to_string());
        }

        let too_large = || format!("Duration is too large: {}", s);
        let mut total: u64 = 0;
        let mut rest = input.as_str();

        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Duration must include a number before {:?}", rest));
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| too_large())?;
            rest = &rest[digits..];

            let multiplier = match rest.chars().next() {
                // A trailing bare number counts as seconds.
                None => 1,
                Some(unit) => {
                    rest = &rest[unit.len_utf8()..];
                    unit_seconds(unit).ok_or_else(|| format!("Invalid duration unit: {}", unit))?
                }
            };

            total = amount
                .checked_mul(multiplier)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(too_large)?;
        }

        if total == 0 {
            return Err("Duration must be greater than zero".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Vila-seca news ingestion and text-to-SQL service", long_about = None)]
struct Cli {
    /// Storage backend: postgres or memory
    #[arg(long, default_value = "postgres")]
    storage: StorageKind,
    /// SQL generator: openai or dummy
    #[arg(long, default_value = "openai")]
    model: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API and run the scraper in the background (default)
    Serve {
        /// Address to listen on (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
        /// Scrape interval, e.g. 6h, 30m, 1h15m (overrides SCRAPE_INTERVAL_HOURS)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Scraper commands
    Scrape(ScraperArgs),
    /// Print the SQL generated for a question
    Sql {
        #[arg(required = true)]
        query: Vec<String>,
    },
}

/// Registry plus the orchestrator built on top of it.
fn build_ingestion(
    kind: StorageKind,
    config: &Config,
) -> anyhow::Result<(Arc<SourceRegistry>, Arc<IngestManager>)> {
    let storage = create_storage(kind, config)?;
    let fetcher = Arc::new(HttpFetcher::from_config(config)?);
    let registry = Arc::new(SourceRegistry::with_default_sources(fetcher)?);
    let manager = Arc::new(IngestManager::new(
        storage,
        registry.discovery_adapters(),
        registry.clone(),
    ));

    let names: Vec<String> = registry
        .scrapers()
        .map(|s| s.source_metadata().source.to_string())
        .collect();
    info!(
        storage = manager.storage_name(),
        "🦗 Scrapers initialized successfully: {}",
        names.join(", ")
    );
    Ok((registry, manager))
}

async fn serve(
    kind: StorageKind,
    config: Config,
    model: &str,
    bind: Option<String>,
    interval: Option<HumanDuration>,
) -> anyhow::Result<()> {
    let generator = create_generator(model, &config)?;
    info!("🧠 SQL generator initialized (using {})", generator.name());

    let ingestion_enabled = kind == StorageKind::Memory || config.ingestion_enabled();
    let scheduler = if ingestion_enabled {
        let (_, manager) = build_ingestion(kind, &config)?;
        let interval = interval.map(|d| d.0).unwrap_or(config.scrape_interval);
        let scheduler = Scheduler::new(manager, interval)?;
        info!("✅ Scraper scheduled every {}", format_duration(scheduler.interval()));
        Some(scheduler.spawn())
    } else {
        warn!("❌ SUPABASE_HOST or SUPABASE_PASSWORD missing, the scraper will not run");
        None
    };

    let app = create_app(AppState::new(generator, ingestion_enabled));
    let bind = bind.unwrap_or_else(|| config.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("🚀 API listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!("👋 Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;

    let command = cli.command.unwrap_or(Commands::Serve {
        bind: None,
        interval: None,
    });

    match command {
        Commands::Serve { bind, interval } => {
            serve(cli.storage, config, &cli.model, bind, interval).await?;
        }
        Commands::Scrape(args) => {
            // Only `run` touches storage.
            let kind = match args.command {
                ScraperCommands::Run => cli.storage,
                _ => StorageKind::Memory,
            };
            let (registry, manager) = build_ingestion(kind, &config)?;
            handle_command(args, &registry, &manager).await?;
        }
        Commands::Sql { query } => {
            let generator = create_generator(&cli.model, &config)?;
            println!("{}", generator.generate_sql(&query.join(" ")).await);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("6h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(6 * 3600));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
    }

    #[test]
    fn test_human_duration_rejects_garbage() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("0h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("6h!".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        let err = "99999999999999999d".parse::<HumanDuration>().unwrap_err();
        assert!(err.contains("too large"));
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999999".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["vsn"]).unwrap();
        assert_eq!(cli.storage, StorageKind::Postgres);
        assert_eq!(cli.model, "openai");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["vsn", "--storage", "memory", "serve", "--interval", "30m"]).unwrap();
        assert_eq!(cli.storage, StorageKind::Memory);
        let Some(Commands::Serve { interval: Some(interval), .. }) = cli.command else {
            panic!("expected serve with an interval");
        };
        assert_eq!(interval.0, Duration::from_secs(1800));

        let cli = Cli::try_parse_from(["vsn", "--model", "dummy", "sql", "telefono", "ayuntamiento"]).unwrap();
        let Some(Commands::Sql { query }) = cli.command else {
            panic!("expected sql");
        };
        assert_eq!(query.join(" "), "telefono ayuntamiento");

        let cli = Cli::try_parse_from(["vsn", "scrape", "discover", "diari"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Scrape(ScraperArgs {
                command: ScraperCommands::Discover { source: Some(_) }
            }))
        ));
    }

    #[test]
    fn test_unknown_storage_is_rejected() {
        assert!(Cli::try_parse_from(["vsn", "--storage", "qdrant"]).is_err());
    }

    #[test]
    fn test_memory_ingestion_builds() {
        let (registry, manager) = build_ingestion(StorageKind::Memory, &Config::default()).unwrap();
        assert_eq!(registry.scrapers().count(), 2);
        assert_eq!(manager.storage_name(), "memory");
    }
}
