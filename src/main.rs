use clap::Parser;
use matchx_api::RestApi;
use matchx_similarity::{EncoderConfig, RecommenderService, DEFAULT_TOP_N};
use matchx_storage::{JsonFileSource, ProfileSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Profile matching and recommendation engine
#[derive(Parser, Debug)]
#[command(name = "matchx")]
#[command(about = "Compatibility-filtered profile recommendations", long_about = None)]
struct Args {
    /// Profile file (JSON array or JSON lines)
    #[arg(short, long)]
    profiles: PathBuf,

    /// Encoder configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print recommendations for this uid as JSON and exit
    #[arg(long)]
    query: Option<String>,

    /// Number of recommendations for --query
    #[arg(long, default_value_t = DEFAULT_TOP_N, allow_negative_numbers = true)]
    top_n: i64,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EncoderConfig> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(EncoderConfig::from_json(&contents)?)
        }
        None => Ok(EncoderConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout is reserved for --query output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting matchX v{}", env!("CARGO_PKG_VERSION"));
    info!("Profiles: {:?}", args.profiles);

    let config = load_config(args.config.as_ref())?;
    let service = Arc::new(RecommenderService::new(config)?);
    let source: Arc<dyn ProfileSource> = Arc::new(JsonFileSource::new(&args.profiles));

    if let Some(uid) = args.query.as_deref() {
        service.fit(source.load()?)?;
        let matches = service.recommend(uid, args.top_n)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "success": true,
                "total": matches.len(),
                "matches": matches
            }))?
        );
        return Ok(());
    }

    match source.load().and_then(|corpus| service.fit(corpus)) {
        Ok(()) => info!("Recommender fitted on {} profiles", service.stats().profiles),
        Err(e) => warn!("Initial fit failed, serving 503 until a refresh succeeds: {}", e),
    }

    let service_http = service.clone();
    let source_http = source.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(service_http, source_http, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("matchX started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
