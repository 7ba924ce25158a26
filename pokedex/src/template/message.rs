use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::client::Context;
use serenity::model::Color;

use pokedex_common::gallery::GalleryItem;

pub fn crate_embed(
    client: &Context,
    title: Option<String>,
    description: Option<String>,
    color: Color,
) -> CreateEmbed {
    // Read the cache guard before building, it must not be held across awaits.
    let (name, avatar) = {
        let user = client.cache.current_user();
        (user.name.clone(), user.avatar_url())
    };
    let mut footer = CreateEmbedFooter::new(name);
    if let Some(avatar) = avatar {
        footer = footer.icon_url(avatar);
    }
    CreateEmbed::new()
        .title(title.unwrap_or("Pokedex".to_string()))
        .description(description.unwrap_or_default())
        .color(color)
        .footer(footer)
}

pub fn error_embed(
    client: &Context,
    mut title: Option<String>,
    description: Option<String>,
) -> CreateEmbed {
    if title.is_none() {
        title = Some("Error".to_string());
    }
    crate_embed(client, title, description, Color::RED)
}

pub fn info_embed(
    client: &Context,
    mut title: Option<String>,
    description: Option<String>,
) -> CreateEmbed {
    if title.is_none() {
        title = Some("Pokedex".to_string());
    }
    crate_embed(client, title, description, Color::DARK_GREEN)
}

/// One card of a gallery: the card id as title, the card scan as image.
pub fn card_embed(item: &GalleryItem) -> CreateEmbed {
    CreateEmbed::new()
        .title(item.caption.as_str())
        .image(item.image.as_str())
        .color(Color::GOLD)
}
