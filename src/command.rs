//! Command execution for the relnotes CLI.
//!
//! Each subcommand lives in its own module and receives a fully built
//! [`ReleaseService`].
use std::{path::Path, sync::Arc};
use tokio::fs;

use crate::{
    assembler::Assembler,
    cli::{Args, Command},
    config::Config,
    error::Result,
    service::ReleaseService,
    store::FileStore,
};

pub mod generate;
pub mod release;
pub mod serve;
pub mod settings;

/// Load configuration, open the store and run the requested subcommand.
pub async fn execute(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let service = build_service(&config).await?;

    match args.command {
        Command::Release(cmd) => release::execute(&service, cmd).await,
        Command::Settings(cmd) => settings::execute(&service, cmd).await,
        Command::Generate { id, output } => {
            generate::execute(&service, &id, output).await
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve::execute(service, &host, port).await
        }
    }
}

/// Service backed by the file store and the HTTP clients from `config`.
pub async fn build_service(config: &Config) -> Result<ReleaseService> {
    let store = FileStore::open(&config.data_dir).await?;
    let assembler = Assembler::from_config(config)?;
    Ok(ReleaseService::new(Arc::new(store), assembler))
}

/// Write `content` to `path`, creating parent directories as needed.
pub async fn write_output(path: &str, content: &str) -> Result<()> {
    let file_path = Path::new(path);

    if let Some(parent) = file_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).await?;
    }

    fs::write(file_path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_output_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes/8.0/release.md");

        write_output(path.to_str().unwrap(), "# notes\n").await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "# notes\n");
    }

    #[tokio::test]
    async fn builds_service_over_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().join("store").to_string_lossy().into_owned(),
            ..Config::default()
        };

        let service = build_service(&config).await.unwrap();

        assert!(service.list_releases().await.unwrap().is_empty());
        assert!(dir.path().join("store/releases").is_dir());
    }
}
