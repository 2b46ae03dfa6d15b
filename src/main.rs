use clap::Parser;
use foster_locations::core::export::{agencies_to_csv, render_text};
use foster_locations::utils::error::ErrorSeverity;
use foster_locations::utils::{logger, validation::Validate};
use foster_locations::{
    CachedLocationStore, CliConfig, ConfigProvider, DirectoryError, InMemoryLocationStore,
    LocationPageService, LocationRequest, LocationView, OutputFormat, RestLocationStore,
    TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let toml = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    // 初始化日誌
    match &toml {
        Some(config) if cli.json_logs || config.json_logs() => {
            logger::init_json_logger(if cli.verbose { "debug" } else { config.log_level() })
        }
        None if cli.json_logs => logger::init_json_logger(if cli.verbose { "debug" } else { "info" }),
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("Starting foster-locations");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let validation = match &toml {
        Some(config) => config.validate(),
        None => cli.validate(),
    };
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let request = LocationRequest::parse(&cli.location);
    if let Err(e) = request.validate() {
        tracing::error!("❌ Invalid location '{}': {}", cli.location, e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    let loaded = match &toml {
        Some(config) => load_view(&cli, config, cli.cache || config.cache_enabled(), &request).await,
        None => load_view(&cli, &cli, cli.cache, &request).await,
    };

    let view = match loaded {
        Ok(view) => view,
        Err(e) => fail(e),
    };

    if view.is_empty() {
        tracing::warn!("No location matches '{}'", cli.location);
        eprintln!("❌ Location '{}' not found", cli.location);
        std::process::exit(4);
    }
    if !view.resolution.is_complete() {
        tracing::warn!("Breadcrumbs for '{}' are incomplete", cli.location);
    }

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => println!("{}", render_text(&view)),
        OutputFormat::Csv => match agencies_to_csv(&view.agencies) {
            Ok(csv) => print!("{}", csv),
            Err(e) => fail(e),
        },
    }

    Ok(())
}

async fn load_view<C: ConfigProvider>(
    cli: &CliConfig,
    config: &C,
    cache: bool,
    request: &LocationRequest,
) -> Result<LocationView, DirectoryError> {
    if let Some(fixture) = &cli.fixture {
        tracing::info!("📁 Resolving against fixture {}", fixture);
        let store = InMemoryLocationStore::from_json_file(fixture)?;
        return Ok(LocationPageService::from_config(store, config).load(request).await);
    }

    let backend = RestLocationStore::from_config(config)?;
    if cache {
        let cached = CachedLocationStore::new(backend);
        cached.warm().await?;
        return Ok(LocationPageService::from_config(cached, config).load(request).await);
    }

    Ok(LocationPageService::from_config(backend, config).load(request).await)
}

fn fail(e: DirectoryError) -> ! {
    tracing::error!(
        "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
