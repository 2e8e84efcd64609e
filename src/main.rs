use clap::Parser;
use library_catalog::core::ConfigProvider;
use library_catalog::utils::error::{CatalogError, ErrorSeverity};
use library_catalog::utils::{logger, validation::Validate};
use library_catalog::{CliConfig, Library, LibraryConfig, LocalStorage, Shell};

fn exit_code(e: &CatalogError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail_startup(e: &CatalogError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let loaded = match &cli.config {
        Some(path) => LibraryConfig::from_file(path),
        None => Ok(LibraryConfig::default()),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            fail_startup(&e);
        }
    };

    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    if config.json_logging() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    if let Err(e) = config.validate() {
        fail_startup(&e);
    }

    tracing::info!("Starting library-catalog");
    tracing::debug!("Config: {:?}", config);

    let storage = LocalStorage::new(config.data_dir());
    let (library, report) = Library::from_config(storage, &config);
    if let Some(e) = &report.error {
        println!("Error loading files: {}", e);
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(library, stdin.lock(), stdout.lock());
    shell.run()?;

    Ok(())
}
