//! CLI command definitions and dispatch.

pub mod browse;
pub mod edit;

use clap::{Parser, Subcommand};

use damfs_core::config::AppConfig;
use damfs_core::error::AppError;

use crate::output::OutputFormat;
use crate::session::Session;

/// DamFS: path-based access to a remote DAM tree
#[derive(Debug, Parser)]
#[command(name = "damfs", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/damfs")]
    pub config: String,

    /// Gateway snapshot file (overrides gateway.snapshot)
    #[arg(short, long, global = true)]
    pub snapshot: Option<String>,

    /// Refuse every mutation
    #[arg(long, global = true)]
    pub read_only: bool,

    /// Write the gateway state back to the snapshot after the command
    #[arg(long, global = true)]
    pub save: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one node
    Stat(browse::StatArgs),
    /// List a folder
    Ls(browse::LsArgs),
    /// Show a folder tree
    Tree(browse::TreeArgs),
    /// Print a document's content
    Cat(browse::CatArgs),
    /// Create a folder
    Mkdir(edit::MkdirArgs),
    /// Upload a local file as a new document
    Put(edit::PutArgs),
    /// Rename a node in place
    Rename(edit::RenameArgs),
    /// Move a node under another folder
    Mv(edit::TransferArgs),
    /// Copy a node under another folder
    Cp(edit::TransferArgs),
    /// Delete a node
    Rm(edit::RmArgs),
    /// Set a document timestamp
    Touch(edit::TouchArgs),
}

impl Cli {
    /// Load the configuration file and apply command-line overrides.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let mut config = AppConfig::load(&self.config)?;
        if let Some(snapshot) = &self.snapshot {
            config.gateway.snapshot = Some(snapshot.clone());
        }
        if self.read_only {
            config.repository.read_only = true;
        }
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let session = Session::open(&config).await?;
        let format = self.format;

        match &self.command {
            Commands::Stat(args) => browse::stat(&session, args, format).await?,
            Commands::Ls(args) => browse::ls(&session, args, format).await?,
            Commands::Tree(args) => browse::tree(&session, args, format).await?,
            Commands::Cat(args) => browse::cat(&session, args).await?,
            Commands::Mkdir(args) => edit::mkdir(&session, args).await?,
            Commands::Put(args) => edit::put(&session, args).await?,
            Commands::Rename(args) => edit::rename(&session, args).await?,
            Commands::Mv(args) => edit::transfer(&session, args, edit::Transfer::Move).await?,
            Commands::Cp(args) => edit::transfer(&session, args, edit::Transfer::Copy).await?,
            Commands::Rm(args) => edit::rm(&session, args).await?,
            Commands::Touch(args) => edit::touch(&session, args).await?,
        }

        if self.save {
            session.save().await?;
        }
        Ok(())
    }
}
