use std::sync::Arc;

use serenity::all::ButtonStyle;
use serenity::async_trait;
use serenity::builder::{CreateActionRow, CreateButton, CreateMessage};
use serenity::http::{Http, HttpError};
use serenity::model::id::ChannelId;

use pokedex_common::command::Cursor;
use pokedex_common::gallery::{GalleryItem, MediaSink};
use pokedex_common::warn;

use crate::template::message;

/// Sends gallery pages as a single message of image embeds.
pub struct ChannelGallery {
    pub http: Arc<Http>,
    pub channel_id: ChannelId,
}

#[async_trait]
impl MediaSink for ChannelGallery {
    type Error = serenity::Error;

    async fn send_media(&self, items: &[GalleryItem]) -> Result<(), serenity::Error> {
        let embeds = items.iter().map(message::card_embed).collect::<Vec<_>>();
        self.channel_id
            .send_message(&self.http, CreateMessage::new().embeds(embeds))
            .await?;
        Ok(())
    }

    fn rejected_item(&self, error: &serenity::Error) -> Option<usize> {
        let http: &HttpError = match error {
            serenity::Error::Http(http) => http,
            _ => return None,
        };
        match http {
            HttpError::UnsuccessfulRequest(response) => response
                .error
                .errors
                .iter()
                .find_map(|why| embed_index(&why.path)),
            _ => None,
        }
    }
}

///
/// Index of the embed an error path points at.
///
/// Discord reports invalid fields with paths like `embeds.3.image.url`.
///
pub fn embed_index(path: &str) -> Option<usize> {
    let mut parts = path.split('.');
    while let Some(part) = parts.next() {
        if part == "embeds" {
            return parts.next()?.parse().ok();
        }
    }
    None
}

/// "Next" button resuming the search at `cursor`, if the payload fits.
pub fn next_button(cursor: &Cursor) -> Option<CreateActionRow> {
    let payload = match cursor.encode() {
        Some(payload) => payload,
        None => {
            warn!("Search name {:?} is too long for a Next button", cursor.name);
            return None;
        }
    };
    let button = CreateButton::new(payload)
        .label("Next")
        .style(ButtonStyle::Primary);
    Some(CreateActionRow::Buttons(vec![button]))
}
