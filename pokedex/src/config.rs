use std::fs;
use std::io;

use serde::{Deserialize, Serialize};

use pokedex_common::constants::{DEFAULT_DATABASE, POKEMONTCG_API_URL};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Log {
    pub level: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Bot {
    pub prefix: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Mongodb,
    Memory,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Storage {
    pub backend: Backend,
    pub database: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Catalog {
    pub api_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub log: Log,
    pub bot: Bot,
    pub storage: Storage,
    pub catalog: Catalog,
}

impl Config {
    pub fn new() -> Config {
        Config {
            log: Log {
                level: "info".to_string(),
            },
            bot: Bot {
                prefix: "/".to_string(),
            },
            storage: Storage {
                backend: Backend::Mongodb,
                database: DEFAULT_DATABASE.to_string(),
            },
            catalog: Catalog {
                api_url: POKEMONTCG_API_URL.to_string(),
            },
        }
    }
    pub fn save(&self, path: &str) -> Result<(), Error> {
        let toml = toml::to_string(&self)?;
        fs::write(path, toml)?;
        Ok(())
    }
    pub fn load(path: &str) -> Result<Config, Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(content.as_str())?;
        Ok(config)
    }
}
