// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotkeep::{
    access::{DynHome, FileAccessor, FixedHome, UserHome},
    api::{self, AppState},
    archive::{export::export, import::import},
    catalog::Catalog,
    config::Config,
    manager::ConfigManager,
    path::default_config_path,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::{fs, net::IpAddr, path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dotkeep [options] <dotkeep-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, env = "DOTKEEP_CONFIG", value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = Config::load(&config_path)
            .with_context(|| format!("failed to load configuration {:?}", config_path.display()))?;

        match self.command {
            Command::Serve(opts) => run_serve(config, opts).await,
            Command::List => run_list(&config),
            Command::Backup(opts) => run_backup(&config, opts),
            Command::Export(opts) => run_export(&config, opts),
            Command::Import(opts) => run_import(&config, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Serve managed files over local HTTP API.
    #[command(override_usage = "dotkeep serve [options]")]
    Serve(ServeOptions),

    /// List managed files that exist.
    #[command(override_usage = "dotkeep list [options]")]
    List,

    /// Create timestamped backup of managed file.
    #[command(override_usage = "dotkeep backup [options] <file_id>")]
    Backup(BackupOptions),

    /// Export managed files into ZIP archive.
    #[command(override_usage = "dotkeep export [options] <archive>")]
    Export(ExportOptions),

    /// Import ZIP archive over managed files.
    #[command(override_usage = "dotkeep import [options] <archive>")]
    Import(ImportOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ServeOptions {
    /// Address to bind to instead of configured one.
    #[arg(short, long, value_name = "address")]
    pub address: Option<IpAddr>,

    /// Port to listen on instead of configured one.
    #[arg(short, long, env = "PORT", value_name = "port")]
    pub port: Option<u16>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct BackupOptions {
    /// Identifier of managed file to back up.
    #[arg(required = true, value_name = "file_id")]
    pub file_id: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ExportOptions {
    /// Path to write archive to.
    #[arg(value_name = "archive", default_value = "linux-configs.zip")]
    pub archive: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ImportOptions {
    /// Path to archive to import.
    #[arg(required = true, value_name = "archive")]
    pub archive: PathBuf,
}

#[rocket::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn open_manager(config: &Config) -> ConfigManager<DynHome> {
    let home: DynHome = match &config.files.home_dir {
        Some(path) => Box::new(FixedHome::new(path.clone())),
        None => Box::new(UserHome),
    };

    ConfigManager::new(Catalog::builtin(), FileAccessor::new(home))
}

async fn run_serve(mut config: Config, opts: ServeOptions) -> Result<()> {
    if let Some(address) = opts.address {
        config.server.address = address;
    }
    if let Some(port) = opts.port {
        config.server.port = port;
    }

    let state = AppState::new(open_manager(&config), config.files.matching);
    info!(
        "serving managed files on http://{}:{}/api",
        config.server.address, config.server.port
    );

    api::build(&config.server, state)
        .launch()
        .await
        .map_err(|err| anyhow!("server stopped: {err}"))?;

    Ok(())
}

fn run_list(config: &Config) -> Result<()> {
    let manager = open_manager(config);
    for file in manager.list_files()? {
        println!("{:<10} {:<12} {} ({} bytes)", file.id, file.category, file.path, file.size);
    }

    Ok(())
}

fn run_backup(config: &Config, opts: BackupOptions) -> Result<()> {
    let receipt = open_manager(config).backup_file(&opts.file_id)?;
    info!("{}: {:?}", receipt.message, receipt.backup_path.display());

    Ok(())
}

fn run_export(config: &Config, opts: ExportOptions) -> Result<()> {
    let bytes = export(&open_manager(config))?;
    fs::write(&opts.archive, bytes)
        .with_context(|| format!("failed to write archive {:?}", opts.archive.display()))?;
    info!("exported managed files to {:?}", opts.archive.display());

    Ok(())
}

fn run_import(config: &Config, opts: ImportOptions) -> Result<()> {
    let bytes = fs::read(&opts.archive)
        .with_context(|| format!("failed to read archive {:?}", opts.archive.display()))?;
    let report = import(&open_manager(config), &config.files.matching, &bytes)?;
    for error in &report.errors {
        info!("skipped: {error}");
    }

    Ok(())
}
