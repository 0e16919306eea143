use crate::properties::Properties;
use macroquad::prelude::*;
use std::path::PathBuf;

/// Horizontal flip flag.
pub const FLIP_H: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
/// Anti-diagonal flip flag.
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
/// Bits of a raw gid that hold the tile id.
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits

/// A raw gid as stored in layer data, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// The value as stored.
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// Gid with flip flags stripped.
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Flipped horizontally.
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Flipped vertically.
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Flipped anti-diagonally.
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// No tile.
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
}

/// One frame of a tileset-declared animation, in tileset-local ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDef {
    /// Tileset-local id shown.
    pub local_id: u32,
    /// Display time in milliseconds.
    pub duration_ms: u32,
}

/// One image atlas laid out on a regular grid.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// Name as written in Tiled.
    pub name: String,
    /// Gid of local tile 0.
    pub first_gid: u32,
    /// Tiles per atlas row.
    pub columns: u32,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Declared number of tiles.
    pub tilecount: u32,
    /// Pixels between tiles.
    pub spacing: u32, // 0 if not used
    /// Pixels around the atlas edge.
    pub margin: u32,  // 0 if not used
    /// Image path, already joined with the directory it is relative to.
    pub image: PathBuf,
    /// Local tile id -> animation frames, in declaration order.
    pub animations: Vec<(u32, Vec<FrameDef>)>,
    /// Custom properties.
    pub properties: Properties,
}

impl Tileset {
    /// Last gid this tileset covers, or `first_gid - 1` when empty.
    #[inline]
    pub fn last_gid(&self) -> u32 {
        self.first_gid.saturating_add(self.tilecount).saturating_sub(1)
    }
}

/// What a layer holds.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// Row-major gids, `width * height` entries.
    Tiles {
        /// Raw gids, flip flags included.
        data: Vec<u32>,
    },
    /// Object groups, image layers, groups: carried but never drawn.
    Other(String),
}

/// A layer of the map, in draw order.
#[derive(Debug, Clone)]
pub struct TileLayer {
    /// Name as written in Tiled.
    pub name: String,
    /// Hidden layers are neither drawn nor walked on.
    pub visible: bool,
    /// Draw opacity, 0 to 1.
    pub opacity: f32,
    /// Pixel offset applied when drawing.
    pub offset: Vec2,
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Custom properties.
    pub properties: Properties,
    /// Tile data, or the type of a non-tile layer.
    pub kind: LayerKind,
}

impl TileLayer {
    /// Tile grid, `None` for non-tile layers.
    pub fn tiles(&self) -> Option<&[u32]> {
        match &self.kind {
            LayerKind::Tiles { data } => Some(data),
            LayerKind::Other(_) => None,
        }
    }

    /// `true` for visible tile layers, the only ones drawn or walked on.
    pub fn is_drawable(&self) -> bool {
        self.visible && matches!(self.kind, LayerKind::Tiles { .. })
    }

    /// Raw gid at `(x, y)`; 0 outside the layer or for non-tile layers.
    pub fn gid_at(&self, x: usize, y: usize) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.tiles()
            .and_then(|data| data.get(y * self.width + x).copied())
            .unwrap_or(0)
    }
}

/// Parsed map, tilesets and layers. Pure data plus lookups.
#[derive(Debug, Clone)]
pub struct TileMap {
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Layers, bottom first.
    pub layers: Vec<TileLayer>, // draw order: array order
    /// Tilesets sorted by `first_gid`.
    pub tilesets: Vec<Tileset>, // sorted by first_gid
    /// Custom properties.
    pub properties: Properties,
}

impl TileMap {
    /// Map size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        vec2(
            self.width as f32 * self.tile_w as f32,
            self.height as f32 * self.tile_h as f32,
        )
    }

    /// Tile size in pixels.
    pub fn tile_size(&self) -> Vec2 {
        vec2(self.tile_w as f32, self.tile_h as f32)
    }

    /// `true` when `(x, y)` is a cell of the map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Owning tileset for a clean gid: the one with the greatest
    /// `first_gid <= gid`.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<&Tileset> {
        if gid == 0 {
            return None;
        }
        self.tilesets.iter().rev().find(|ts| gid >= ts.first_gid)
    }

    /// First tileset called `name`.
    pub fn tileset_by_name(&self, name: &str) -> Option<&Tileset> {
        self.tilesets.iter().find(|ts| ts.name == name)
    }

    /// Highest gid any tileset covers.
    pub fn max_gid(&self) -> u32 {
        self.tilesets.iter().map(Tileset::last_gid).max().unwrap_or(0)
    }

    /// First layer called `name`.
    pub fn layer_by_name(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Drawable layers in draw order.
    pub fn visible_tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter(|l| l.is_drawable())
    }
}
