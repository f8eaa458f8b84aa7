use clap::Parser;
use itemmap_api::RestApi;
use itemmap_query::{Embedder, HashingEmbedder, DEFAULT_EMBEDDING_DIM};
use itemmap_storage::StorageManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Search configuration and related-record query service
#[derive(Parser, Debug)]
#[command(name = "itemmap")]
#[command(about = "Hybrid k-NN + exact-match search configuration service", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 6333)]
    http_port: u16,

    /// Dimension of the embeddings stored in the search index
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIM)]
    embedding_dim: usize,

    /// Keep index records in memory only
    #[arg(long)]
    in_memory: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
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

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting itemmap v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP API port: {}", args.http_port);

    let storage = if args.in_memory {
        info!("Index records kept in memory");
        Arc::new(StorageManager::in_memory())
    } else {
        info!("Data directory: {:?}", args.data_dir);
        Arc::new(StorageManager::new(&args.data_dir)?)
    };

    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(args.embedding_dim));
    info!("Embedding dimension: {}", embedder.dimension());

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(storage, embedder, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/indexes", args.http_port);

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
