use crate::config::SpriteConfig;
use crate::error::MapError;
use crate::map::TileMap;
use crate::renderer::CharacterSprites;
use crate::resolver::TilesetImages;
use log::{debug, info};
use macroquad::prelude::*;
use std::path::Path;

async fn load_texture_at(path: &Path) -> Result<Texture2D, MapError> {
    let path_str = path.to_str().ok_or_else(|| MapError::Texture {
        path: path.to_path_buf(),
        message: "path is not valid UTF-8".into(),
    })?;

    let tex = load_texture(path_str).await.map_err(|e| MapError::Texture {
        path: path.to_path_buf(),
        message: format!("{e:?}"),
    })?;
    tex.set_filter(FilterMode::Nearest);
    debug!("loaded texture {} ({}x{})", path.display(), tex.width(), tex.height());
    Ok(tex)
}

/// Loads every tileset image of `map`, keyed by tileset name.
pub async fn load_tileset_images(map: &TileMap) -> Result<TilesetImages<Texture2D>, MapError> {
    let mut images = TilesetImages::with_capacity(map.tilesets.len());
    for ts in &map.tilesets {
        let tex = load_texture_at(&ts.image).await?;
        images.insert(ts.name.clone(), tex);
    }
    info!("loaded {} tileset images", images.len());
    Ok(images)
}

/// Loads the idle and walk sheets described by `layout`.
pub async fn load_character_sprites(
    layout: &SpriteConfig,
) -> Result<CharacterSprites<Texture2D>, MapError> {
    let idle = load_texture_at(&layout.idle.path).await?;
    let walk = load_texture_at(&layout.walk.path).await?;
    Ok(CharacterSprites {
        idle,
        walk,
        layout: layout.clone(),
    })
}
