use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use atelier::http::{self, AccessGate};
use atelier::{Config, Gallery, MetadataBackend, ObjectsBackend, Result};

#[derive(Parser)]
struct Cli {
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .compact()
        .init();

    // load configuration
    let mut config_file = File::open(cli.config_file.unwrap_or("./dev-config.yml".into()))?;
    let mut s = String::new();
    config_file.read_to_string(&mut s)?;
    let mut config: Config = serde_yaml::from_str(&s)?;
    config.apply_env_overrides();

    if !config.auth.enabled {
        tracing::warn!("access gate disabled; mutating endpoints are open");
    }

    // initialize persistence layers
    let metadata = match &config.metadata {
        MetadataBackend::Sqlite(cfg) => cfg.new_metadata().await?,
    };
    let gate = AccessGate::new(&config.auth);

    let router = match &config.objects {
        ObjectsBackend::Local(cfg) => {
            let objects = cfg.new_objects();
            let static_files = Some((
                objects.public_url().to_string(),
                objects.directory().to_path_buf(),
            ));
            http::router(
                Gallery::new(metadata, objects),
                gate,
                &config.http.cors_origins,
                static_files,
            )?
        }
        ObjectsBackend::S3(cfg) => {
            let objects = cfg.new_objects().await?;
            http::router(
                Gallery::new(metadata, objects),
                gate,
                &config.http.cors_origins,
                None,
            )?
        }
    };

    http::serve(router, config.http.port).await
}
