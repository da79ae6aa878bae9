use std::path::PathBuf;

use clap::Parser;

use crate::config::{Settings, StorageKind};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Env file to read RECIPES_* settings from (defaults to ./.env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Address to bind, overrides RECIPES_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overrides RECIPES_PORT
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Recipe storage backend, overrides RECIPES_STORAGE
    #[arg(long, value_enum)]
    pub storage: Option<StorageKind>,
}

impl Cli {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(storage) = self.storage {
            settings.storage = storage;
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from(["recipe_assistant", "--port", "9100", "--storage", "mongo"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.storage, StorageKind::Mongo);
        assert_eq!(settings.host, "0.0.0.0");
    }
}
