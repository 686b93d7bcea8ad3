use std::sync::Arc;

use anyhow::Context;
use common::storage::AssetHost;
use common::storage::filesystem::FilesystemAssetHost;
use server::config::{AppConfig, StorageBackend};
use server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected and schema synced");

    let assets = build_asset_host(&config).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { db, config, assets };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_asset_host(config: &AppConfig) -> anyhow::Result<Arc<dyn AssetHost>> {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Filesystem => {
            let fs = storage
                .filesystem
                .as_ref()
                .context("storage.filesystem must be configured")?;
            let host = FilesystemAssetHost::new(
                fs.root.clone(),
                fs.public_base_url.clone(),
                storage.max_asset_size,
            )
            .await
            .context("Failed to initialize filesystem asset host")?;
            info!(root = %fs.root.display(), "Using filesystem asset host");
            Ok(Arc::new(host))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            use common::storage::s3::{S3AssetHost, S3Settings};

            let s3 = storage
                .s3
                .as_ref()
                .context("storage.s3 must be configured")?;
            let host = S3AssetHost::new(S3Settings {
                bucket: s3.bucket.clone(),
                region: s3.region.clone(),
                endpoint: s3.endpoint.clone(),
                access_key: s3.access_key.clone(),
                secret_key: s3.secret_key.clone(),
                path_style: s3.path_style,
                public_base_url: s3.public_base_url.clone(),
                max_size: storage.max_asset_size,
            })
            .context("Failed to initialize S3 asset host")?;
            info!(bucket = %s3.bucket, "Using S3 asset host");
            Ok(Arc::new(host))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => {
            anyhow::bail!("storage.backend = \"s3\" requires the `object-storage` feature")
        }
    }
}
