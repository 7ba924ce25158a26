use std::sync::Arc;

use serenity::builder::CreateMessage;
use serenity::client::Context;
use serenity::model::id::ChannelId;
use serenity::model::user::User as DiscordUser;

use pokedex_common::catalog::Catalog;
use pokedex_common::command::{Command, Cursor, UsageError};
use pokedex_common::gallery::{self, Gallery, GalleryItem};
use pokedex_common::ledger::Ledger;
use pokedex_common::structs::User;
use pokedex_common::{debug, error, info, warn};

use crate::config::Config;
use crate::gallery::{next_button, ChannelGallery};
use crate::helper;
use crate::template::reply;

/// Everything a command needs, handed to the event handler at startup.
pub struct Pokedex {
    pub config: Config,
    pub ledger: Ledger,
    pub catalog: Arc<dyn Catalog>,
}

fn ledger_user(user: &DiscordUser) -> User {
    User {
        // Snowflakes stay below 2^63.
        id: user.id.get() as i64,
        username: user.name.clone(),
    }
}

impl Pokedex {
    pub async fn dispatch(
        &self,
        ctx: &Context,
        channel_id: ChannelId,
        author: &DiscordUser,
        command: Result<Command, UsageError>,
    ) {
        let command = match command {
            Ok(command) => command,
            Err(why) => {
                debug!("Usage error from {}: {:?}", author.id, why);
                helper::error_message(ctx, channel_id, reply::usage(why).to_string()).await;
                return;
            }
        };
        debug!("Command from {}: {:?}", author.id, command);
        let user = ledger_user(author);
        match command {
            Command::Start => self.start(ctx, channel_id, &user).await,
            Command::Find { name, offset } => self.find(ctx, channel_id, &name, offset).await,
            Command::List => self.list(ctx, channel_id, &user).await,
            Command::Delete { id } => self.delete(ctx, channel_id, &user, &id).await,
            Command::Add { id } => self.add(ctx, channel_id, &user, &id).await,
        }
    }

    async fn start(&self, ctx: &Context, channel_id: ChannelId, user: &User) {
        if let Err(why) = self.ledger.register(user).await {
            error!("Failed to register user {}: {:?}", user.id, why);
            helper::error_message(ctx, channel_id, reply::failure(&why).to_string()).await;
            return;
        }
        helper::info_message(ctx, channel_id, reply::help(&self.config.bot.prefix)).await;
    }

    async fn find(&self, ctx: &Context, channel_id: ChannelId, name: &str, offset: usize) {
        let cards = match self.catalog.search(name).await {
            Ok(cards) => cards,
            Err(why) => {
                error!("Failed to search the catalog for {}: {:?}", name, why);
                helper::error_message(ctx, channel_id, reply::failure(&why).to_string()).await;
                return;
            }
        };
        let items = cards.iter().map(GalleryItem::from).collect::<Vec<_>>();
        let page = match gallery::gallery(&items, offset) {
            Gallery::NoResults => {
                helper::info_message(ctx, channel_id, reply::NO_RESULTS.to_string()).await;
                return;
            }
            Gallery::Page(page) if page.is_exhausted() => {
                helper::info_message(ctx, channel_id, reply::EXHAUSTED.to_string()).await;
                return;
            }
            Gallery::Page(page) => page,
        };
        let sink = ChannelGallery {
            http: ctx.http.clone(),
            channel_id,
        };
        match gallery::deliver(&sink, page.items).await {
            Ok(delivery) => {
                info!(
                    "Sent {} cards for {} at offset {}",
                    delivery.sent.len(),
                    name,
                    page.offset
                );
                if let Some(dropped) = delivery.dropped {
                    warn!(
                        "Left out {} from the gallery for {}",
                        page.items[dropped].caption, name
                    );
                }
            }
            Err(why) => {
                error!("Failed to send gallery for {}: {:?}", name, why);
                helper::error_message(ctx, channel_id, reply::DELIVERY_FAILED.to_string()).await;
                return;
            }
        }
        let mut prompt = CreateMessage::new().content(reply::FORWARD_PROMPT);
        if let Some(row) = page
            .next
            .and_then(|next| next_button(&Cursor::new(name, next)))
        {
            prompt = prompt.components(vec![row]);
        }
        if let Err(why) = channel_id.send_message(ctx, prompt).await {
            error!("Failed to send prompt: {:?}", why);
        }
    }

    async fn list(&self, ctx: &Context, channel_id: ChannelId, user: &User) {
        match self.ledger.list(user.id).await {
            Ok(cards) => helper::info_message(ctx, channel_id, reply::pokedex(&cards)).await,
            Err(why) => {
                error!("Failed to list cards of {}: {:?}", user.id, why);
                helper::error_message(ctx, channel_id, reply::failure(&why).to_string()).await;
            }
        }
    }

    async fn delete(&self, ctx: &Context, channel_id: ChannelId, user: &User, id: &str) {
        match self.ledger.remove(user.id, id).await {
            Ok(outcome) => helper::info_message(ctx, channel_id, reply::removed(&outcome)).await,
            Err(why) => {
                error!("Failed to delete {} for {}: {:?}", id, user.id, why);
                helper::error_message(ctx, channel_id, reply::failure(&why).to_string()).await;
            }
        }
    }

    async fn add(&self, ctx: &Context, channel_id: ChannelId, user: &User, id: &str) {
        match self.ledger.add(user, id).await {
            Ok(outcome) => helper::info_message(ctx, channel_id, reply::added(&outcome)).await,
            Err(why) => {
                error!("Failed to add {} for {}: {:?}", id, user.id, why);
                helper::error_message(ctx, channel_id, reply::failure(&why).to_string()).await;
            }
        }
    }
}
