use serenity::builder::CreateMessage;
use serenity::client::Context;
use serenity::model::id::ChannelId;

use pokedex_common::error;

use crate::template::message;
use crate::template::reply;

pub async fn error_message(ctx: &Context, channel_id: ChannelId, content: String) {
    let embed = message::error_embed(ctx, None, Some(content));
    if let Err(why) = channel_id
        .send_message(ctx, CreateMessage::new().add_embed(embed))
        .await
    {
        error!("Failed to send error message: {:?}", why);
    }
}

/// Send `content` as info embeds, split over several messages when long.
pub async fn info_message(ctx: &Context, channel_id: ChannelId, content: String) {
    for part in reply::chunk(&content, reply::MAX_DESCRIPTION_LEN) {
        let embed = message::info_embed(ctx, None, Some(part));
        if let Err(why) = channel_id
            .send_message(ctx, CreateMessage::new().add_embed(embed))
            .await
        {
            error!("Failed to send message: {:?}", why);
            return;
        }
    }
}
