use clap::Parser;
use trip_quote::core::Storage;
use trip_quote::utils::error::ErrorSeverity;
use trip_quote::utils::{logger, validation::Validate};
use trip_quote::{LocalStorage, QuoteEngine, QuoteError, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-quote")]
#[command(about = "Generate a trip quote document from a TOML job file")]
struct Args {
    /// Path to TOML job file
    #[arg(short, long, default_value = "quote.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Validate the job and list its inputs without generating anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading quote job from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Job validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_job_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no document will be generated");
        return Ok(());
    }

    match run(&config).await {
        Ok(path) => {
            tracing::info!("✅ Quote document generated");
            println!("✅ 报价方案生成成功！");
            println!("📁 Output saved to: {}", path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(config: &TomlConfig) -> Result<String, QuoteError> {
    let output_dir = config.resolve(config.output_path()?);
    let output_dir = output_dir.to_string_lossy().into_owned();

    let form = config.load_form_input().await?;
    let engine = QuoteEngine::new(LocalStorage::new(output_dir));
    let quote = engine.run(form).await?;

    engine.storage().write_file(&quote.file_name, &quote.bytes).await?;
    Ok(engine
        .storage()
        .full_path(&quote.file_name)
        .display()
        .to_string())
}

fn display_job_summary(config: &TomlConfig) {
    tracing::info!("📋 Job summary:");
    tracing::info!("  Title: {}", config.quote.title);
    tracing::info!("  Date: {} ({} pax)", config.quote.date, config.quote.pax);
    tracing::info!(
        "  Logo: {}",
        config.uploads.logo.as_deref().unwrap_or("(none)")
    );
    tracing::info!(
        "  Itinerary: {}",
        config.uploads.itinerary.as_deref().unwrap_or("(placeholder days)")
    );
    tracing::info!("  Images: {}", config.uploads.images.len());
    if let Ok(path) = config.output_path() {
        tracing::info!("  Output: {}", path);
    }
}
