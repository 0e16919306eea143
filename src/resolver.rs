use crate::animation::AnimationScheduler;
use crate::map::{TileId, TileMap, Tileset};
use log::trace;
use macroquad::prelude::*;
use std::collections::HashMap;

/// Column counts to use instead of a tileset's declared `columns`, for atlases
/// whose packed layout disagrees with their metadata. Keyed by tileset name.
pub type ColumnOverrides = HashMap<String, u32>;

/// Loaded images keyed by tileset name.
pub type TilesetImages<I> = HashMap<String, I>;

/// Where to copy a tile from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTile<'a, I> {
    /// Atlas to copy from.
    pub image: &'a I,
    /// Pixel rectangle inside the atlas.
    pub source: Rect,
    /// Draw mirrored horizontally.
    pub flip_x: bool,
    /// Draw mirrored vertically.
    pub flip_y: bool,
}

/// Maps gids to atlas rectangles, honouring the active animation frame.
#[derive(Debug, Clone, Default)]
pub struct TileResolver {
    overrides: ColumnOverrides,
}

impl TileResolver {
    /// Resolver using `overrides` for column counts.
    pub fn new(overrides: ColumnOverrides) -> Self {
        Self { overrides }
    }

    /// Column overrides in use.
    pub fn overrides(&self) -> &ColumnOverrides {
        &self.overrides
    }

    /// Columns used to lay out `ts`.
    pub fn columns_for(&self, ts: &Tileset) -> u32 {
        self.overrides.get(&ts.name).copied().unwrap_or(ts.columns)
    }

    /// Source rectangle of a clean gid inside its tileset, after animation
    /// substitution. `None` for empty cells and gids no tileset owns.
    pub fn source_rect<'m>(
        &self,
        gid: u32,
        map: &'m TileMap,
        scheduler: &AnimationScheduler,
    ) -> Option<(&'m Tileset, Rect)> {
        if gid == 0 {
            return None;
        }
        let effective = scheduler.current_target(gid);
        let Some(ts) = map.tileset_for_gid(effective) else {
            trace!("gid {effective} matches no tileset");
            return None;
        };

        let columns = self.columns_for(ts);
        if columns == 0 {
            trace!("tileset '{}' has no columns", ts.name);
            return None;
        }

        let local = effective - ts.first_gid;
        let col = local % columns;
        let row = local / columns;
        let sx = ts.margin + col * (ts.tile_w + ts.spacing);
        let sy = ts.margin + row * (ts.tile_h + ts.spacing);

        Some((
            ts,
            Rect::new(sx as f32, sy as f32, ts.tile_w as f32, ts.tile_h as f32),
        ))
    }

    /// Resolves a raw layer gid (flip flags allowed) to an image and source
    /// rectangle. A tileset without a loaded image resolves to `None`.
    pub fn resolve<'a, I>(
        &self,
        raw_gid: u32,
        map: &TileMap,
        scheduler: &AnimationScheduler,
        images: &'a TilesetImages<I>,
    ) -> Option<ResolvedTile<'a, I>> {
        let id = TileId(raw_gid);
        let (ts, source) = self.source_rect(id.clean(), map, scheduler)?;
        let Some(image) = images.get(&ts.name) else {
            trace!("no image loaded for tileset '{}'", ts.name);
            return None;
        };

        Some(ResolvedTile {
            image,
            source,
            flip_x: id.flip_h(),
            flip_y: id.flip_v(),
        })
    }
}
