pub use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{self, fmt, EnvFilter};

pub mod catalog;
pub mod command;
pub mod constants;
pub mod database;
pub mod error;
pub mod gallery;
pub mod ledger;
pub mod structs;

pub use error::{Error, Result};

pub fn setup_logger(level: &str) -> Result<()> {
    let formatter = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);
    let level = level.to_lowercase();
    let mut filter = EnvFilter::builder()
        .from_env()
        .map_err(|why| Error::Logger(why.to_string()))?;
    // Targets use the crate name with underscores.
    for target in ["pokedex", "pokedex_common"] {
        let directive = format!("{}={}", target, level)
            .parse()
            .map_err(|why| Error::Logger(format!("{:?}", why)))?;
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .event_format(formatter)
        .with_env_filter(filter)
        .try_init()
        .map_err(|why| Error::Logger(why.to_string()))?;
    Ok(())
}
