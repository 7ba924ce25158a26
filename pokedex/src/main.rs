use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

use dotenvy::dotenv;
use serenity::async_trait;
use serenity::builder::CreateInteractionResponse;
use serenity::model::application::Interaction;
use serenity::model::channel::{Attachment, Message};
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use pokedex_common::catalog::{Catalog, PokemonTcgClient};
use pokedex_common::command::Command;
use pokedex_common::database::memory::MemoryStore;
use pokedex_common::database::mongo::MongoStore;
use pokedex_common::database::Store;
use pokedex_common::ledger::Ledger;
use pokedex_common::{debug, error, info, setup_logger, trace, warn};

use crate::config::{Backend, Config};
use crate::handlers::Pokedex;

mod config;
mod gallery;
mod handlers;
mod helper;
mod template;

const CONFIG_PATH: &str = "./config.toml";

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Common(#[from] pokedex_common::Error),
    #[error("discord client error: {0}")]
    Discord(#[from] serenity::Error),
}

fn is_image(attachment: &Attachment) -> bool {
    match attachment.content_type {
        Some(ref content_type) => content_type.starts_with("image/"),
        None => attachment.width.is_some(),
    }
}

struct Handler {
    pokedex: Pokedex,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        trace!("Message: {}, sender: {}", msg.content, msg.author.id);
        let command = match Command::parse(&self.pokedex.config.bot.prefix, &msg.content) {
            Some(command) => command,
            None if msg.attachments.iter().any(is_image) => Command::from_caption(&msg.content),
            None => return,
        };
        self.pokedex
            .dispatch(&ctx, msg.channel_id, &msg.author, command)
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let component = match interaction {
            Interaction::Component(component) => component,
            _ => return,
        };
        if let Err(why) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            error!("Failed to acknowledge interaction: {:?}", why);
        }
        let command = match Command::from_cursor(&component.data.custom_id) {
            Some(command) => command,
            None => {
                debug!("Ignoring component {:?}", component.data.custom_id);
                return;
            }
        };
        self.pokedex
            .dispatch(&ctx, component.channel_id, &component.user, Ok(command))
            .await;
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("Connected as {}", ready.user.name);
    }
}

fn load_config() -> Result<Config, config::Error> {
    if Path::new(CONFIG_PATH).exists() {
        return Config::load(CONFIG_PATH);
    }
    let config = Config::new();
    config.save(CONFIG_PATH)?;
    Ok(config)
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, pokedex_common::Error> {
    match config.storage.backend {
        Backend::Mongodb => {
            let database =
                env::var("MONGODB_DATABASE").unwrap_or(config.storage.database.clone());
            info!("Connecting to MongoDB database {}...", database);
            Ok(Arc::new(MongoStore::from_env(&database).await?))
        }
        Backend::Memory => {
            warn!("Using the in-memory store, every Pokedex is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = load_config()?;
    let log_level = env::var("LOG_LEVEL").unwrap_or(config.log.level.clone());
    setup_logger(&log_level)?;
    info!(
        "Pokedex v{} ({}, {} build)",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE")
    );
    info!("Log level: {}", log_level);
    let token =
        env::var("DISCORD_TOKEN").map_err(|_| pokedex_common::Error::MissingEnv("DISCORD_TOKEN"))?;
    info!("Initializing database...");
    let store = open_store(&config).await?;
    let api_key = env::var("POKEMONTCG_IO_API_KEY").ok();
    if api_key.is_none() {
        warn!("No POKEMONTCG_IO_API_KEY provided, the catalog applies stricter rate limits");
    }
    let catalog: Arc<dyn Catalog> =
        Arc::new(PokemonTcgClient::new(&config.catalog.api_url, api_key)?);
    let handler = Handler {
        pokedex: Pokedex {
            ledger: Ledger::new(store, catalog.clone()),
            catalog,
            config,
        },
    };
    info!("Initializing Discord client...");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(token, intents)
        .event_handler(handler)
        .await?;
    info!("Starting client...");
    client.start().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    match dotenv() {
        Ok(_) => {}
        Err(why) => {
            eprintln!("Failed to load .env: {:?}", why);
        }
    }
    if let Err(why) = run().await {
        // The logger may not be up yet.
        eprintln!("Fatal: {}", why);
        process::exit(1);
    }
}
