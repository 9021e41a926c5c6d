use backend::stores::{PersistError, PersistResult, StoreConfig, file::DEFAULT_SETTINGS_PATH};
use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::models::SettingField;
use std::net::IpAddr;
use std::path::PathBuf;

const DEFAULT_SQLITE_PATH: &str = "settings.db";

#[derive(Parser)]
#[command(name = "paramdeck", about = "Tune and persist generation settings")]
pub struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = StoreKind::File)]
    pub store: StoreKind,
    /// Settings file or database path (file and sqlite stores)
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,
    /// Database URL (postgres) or server base URL (remote)
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// Default log directive when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    File,
    Sqlite,
    Postgres,
    Remote,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Serve the settings API")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Static bundle served for any path outside the API
        #[arg(long)]
        dist_dir: Option<PathBuf>,
    },
    #[command(about = "Print the saved settings and which of them are active")]
    Show {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Change settings and save them")]
    Set(SetArgs),
    #[command(about = "Restore and save the default settings")]
    Reset,
}

#[derive(Args, Debug, Default)]
pub struct SetArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub top_p: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub top_k: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub strictness: Option<String>,
    /// on/off
    #[arg(long)]
    pub ai_search: Option<String>,
    /// on/off
    #[arg(long)]
    pub data_limit: Option<String>,
}

impl SetArgs {
    /// Requested edits in wire order.
    pub fn edits(&self) -> Vec<(SettingField, &str)> {
        [
            (SettingField::Temperature, &self.temperature),
            (SettingField::TopP, &self.top_p),
            (SettingField::AiSearchEnabled, &self.ai_search),
            (SettingField::DataResponseLimitEnabled, &self.data_limit),
            (SettingField::TopK, &self.top_k),
            (SettingField::Strictness, &self.strictness),
        ]
        .into_iter()
        .filter_map(|(field, raw)| raw.as_deref().map(|raw| (field, raw)))
        .collect()
    }
}

impl Cli {
    pub fn store_config(&self) -> PersistResult<StoreConfig> {
        let url = |kind: &str| {
            self.url
                .clone()
                .ok_or_else(|| PersistError::Config(format!("--url is required for the {kind} store")))
        };

        let path_store = matches!(self.store, StoreKind::File | StoreKind::Sqlite);
        let store_name = format!("{:?}", self.store).to_lowercase();
        if path_store && self.url.is_some() {
            return Err(PersistError::Config(format!(
                "--url does not apply to the {store_name} store; use --path"
            )));
        }
        if !path_store && self.path.is_some() {
            return Err(PersistError::Config(format!(
                "--path does not apply to the {store_name} store; use --url"
            )));
        }

        Ok(match self.store {
            StoreKind::File => StoreConfig::File {
                path: self.path.clone().unwrap_or_else(|| DEFAULT_SETTINGS_PATH.into()),
            },
            StoreKind::Sqlite => StoreConfig::Sqlite {
                path: self.path.clone().unwrap_or_else(|| DEFAULT_SQLITE_PATH.into()),
            },
            StoreKind::Postgres => StoreConfig::Postgres {
                url: url("postgres")?,
            },
            StoreKind::Remote => StoreConfig::Remote {
                base_url: url("remote")?,
            },
        })
    }
}
