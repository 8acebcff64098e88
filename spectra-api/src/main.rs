use std::{net::IpAddr, str::FromStr, sync::Arc};

use spectra_config::CONFIG;
use spectra_core::{Runtime, RuntimeOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> anyhow::Result<()> {
    setup_tracing();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(CONFIG.worker_threads)
        .enable_all()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build the tokio runtime: {}", e))?
        .block_on(serve())
}

async fn serve() -> anyhow::Result<()> {
    let options = RuntimeOptions {
        healpix_root: CONFIG.healpix_root.clone(),
        partition_extension: CONFIG.partition_extension.clone(),
        io_timeout: CONFIG.io_timeout(),
    };

    // Without a catalog no request can be answered, refuse to start.
    let runtime = Arc::new(
        Runtime::init(&CONFIG.catalog_path, options)
            .map_err(|e| anyhow::anyhow!("Failed to initialize the catalog: {}", e))?,
    );

    let router = spectra_api::build_router(runtime.clone());

    let addr = std::net::SocketAddr::new(
        IpAddr::from_str(&CONFIG.host)
            .map_err(|e| anyhow::anyhow!("Failed to parse IP address from config: {}", e))?,
        CONFIG.port,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to address {}: {}", addr, e))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    drop(runtime);
    tracing::info!("Catalog released, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn setup_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level.
                format!(
                    "{}={level},spectra_core={level},spectra_catalog={level},spectra_partition={level},tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME"),
                    level = CONFIG.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
