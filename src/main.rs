use clap::Parser;
use servicehub::config::cli::{parse_role, Command, SearchArgs};
use servicehub::config::toml_config::LogFormat;
use servicehub::core::navigation::{routes_for, NavState, Navigator};
use servicehub::domain::model::{Category, ServiceListing};
use servicehub::utils::error::ErrorSeverity;
use servicehub::utils::{logger, validation::Validate};
use servicehub::{
    AppConfig, Catalog, Cli, CsvCatalogSource, InMemoryAuthBackend, SeedCatalogSource, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    // 命令列覆蓋設定
    if let Some(catalog) = &cli.catalog {
        config.catalog.path = Some(catalog.clone());
    }

    match config.logging.format {
        LogFormat::Json => logger::init_json_logger(cli.verbose, &config.logging.level),
        LogFormat::Compact => logger::init_cli_logger(cli.verbose, &config.logging.level),
    }

    tracing::info!("Starting servicehub");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,
            ErrorSeverity::Medium => 3,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 4,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &Cli, config: &AppConfig) -> servicehub::Result<()> {
    match &cli.command {
        Command::Search(args) => search(cli, config, args),
        Command::Routes { role } => {
            let role = parse_role(role.as_deref())?;
            print_routes(NavState::resolve(false, role.is_some(), role));
            Ok(())
        }
        Command::Categories => {
            let catalog = load_catalog(config)?;
            for category in Category::ALL {
                let count = catalog
                    .listings()
                    .iter()
                    .filter(|l| l.category == category)
                    .count();
                println!(
                    "{:<14} {:<22} {} {:>3}",
                    category.label(),
                    category.icon(),
                    category.color(),
                    count
                );
            }
            Ok(())
        }
        Command::Login { email, password } => {
            let backend = InMemoryAuthBackend::with_demo_accounts();
            let mut session = Session::with_retry_policy(backend, config.retry_policy());
            let mut navigator = Navigator::new(session.nav_state());

            let user = session.login(email, password).await?;
            println!("✅ Signed in as {} ({})", user.name, user.role);

            navigator.sync(session.nav_state());
            if let Some(route) = navigator.current() {
                println!("📍 Landing screen: {}", route.screen);
            }
            print_routes(navigator.state());
            Ok(())
        }
    }
}

fn load_catalog(config: &AppConfig) -> servicehub::Result<Catalog> {
    match &config.catalog.path {
        Some(path) => {
            tracing::info!("📁 Loading catalog from {}", path);
            Catalog::load(&CsvCatalogSource::new(path))
        }
        None => Catalog::load(&SeedCatalogSource),
    }
}

fn search(cli: &Cli, config: &AppConfig, args: &SearchArgs) -> servicehub::Result<()> {
    let catalog = load_catalog(config)?;
    let filter = args.apply_to(config.default_filter()?)?;
    let results = catalog.search(&filter)?;

    tracing::info!("🔍 {} of {} listings match", results.len(), catalog.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No services match the current filters.");
        return Ok(());
    }

    for listing in results {
        print_listing(listing);
    }
    Ok(())
}

fn print_listing(listing: &ServiceListing) {
    println!(
        "{:>3}  {:<26} {:<13} {:<18} ⭐ {:.1}  {:<12} {}",
        listing.id,
        listing.name,
        listing.category.label(),
        listing.provider_name,
        listing.provider_rating,
        listing.price_text(),
        listing.distance_text()
    );
}

fn print_routes(state: NavState) {
    let routes = routes_for(state);
    println!("📋 Navigation for {}:", state);
    match routes.initial {
        Some(initial) => println!("  Initial: {}", initial),
        None => println!("  Initial: (none)"),
    }
    if !routes.tabs.is_empty() {
        println!("  Tabs:");
        for tab in routes.tabs {
            let (title, icon) = tab.tab_item().unwrap_or(("", ""));
            println!("    {:<16} {:<8} [{}]", tab.to_string(), title, icon);
        }
    }
    if !routes.stack.is_empty() {
        println!("  Stack:");
        for screen in routes.stack {
            println!("    {}", screen);
        }
    }
}
