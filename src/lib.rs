#![warn(missing_docs)]

//! Animated Tiled JSON maps with a grid-walking character for Macroquad.

mod animation;
mod assets;
mod camera;
mod config;
mod error;
mod loader {
    pub mod json_loader;
}
mod map;
mod movement;
mod properties;
mod renderer;
mod resolver;
mod session;
mod surface;

pub use animation::{AnimationRule, AnimationScheduler, AnimationState, Frame};
pub use assets::{load_character_sprites, load_tileset_images};
pub use camera::{compute_offset, visible_tile_range, TileWindow};
pub use config::{CharacterConfig, DirectionRows, MovementConfig, SheetConfig, SpriteConfig, WalkerConfig};
pub use error::MapError;
pub use loader::json_loader::{decode_map_file, decode_map_str};
pub use map::{FrameDef, LayerKind, TileId, TileLayer, TileMap, Tileset, GID_MASK};
pub use movement::{
    Blocked, Character, Direction, GridPos, GridRect, LayerRole, LayerRoles, MoveOutcome,
    MoveState, MovementController, WalkRules,
};
pub use properties::{Properties, PropertyValue};
pub use renderer::{CharacterSprites, FrameRenderer};
pub use resolver::{ColumnOverrides, ResolvedTile, TileResolver, TilesetImages};
pub use session::{held_directions, WalkerSession};
pub use surface::{DrawOptions, MacroquadSurface, Surface};
