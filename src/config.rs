//! Walker configuration.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! values it changes. The defaults describe a 16 px map walked by a 32×32
//! character at 0.008 cells/ms.

use crate::animation::AnimationRule;
use crate::error::MapError;
use crate::movement::{Direction, GridPos, WalkRules};
use crate::resolver::ColumnOverrides;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Movement timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Interpolation rate in cells per millisecond; 0 snaps.
    pub speed_cells_per_ms: f64,
    /// Minimum time between two move attempts.
    pub cooldown_ms: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed_cells_per_ms: 0.008,
            cooldown_ms: 150.0,
        }
    }
}

/// One character spritesheet: `columns` animation frames per row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SheetConfig {
    /// Image file.
    pub path: PathBuf,
    /// Frames per row.
    pub columns: usize,
    /// Rows follow the facing direction; otherwise row 0 is always used.
    #[serde(default)]
    pub directional: bool,
}

/// Spritesheet row per facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DirectionRows {
    /// Row for facing up.
    pub up: u32,
    /// Row for facing down.
    pub down: u32,
    /// Row for facing left.
    pub left: u32,
    /// Row for facing right.
    pub right: u32,
}

impl Default for DirectionRows {
    fn default() -> Self {
        Self { up: 1, down: 0, left: 2, right: 2 }
    }
}

impl DirectionRows {
    /// Row drawn while facing `dir`.
    pub fn row(&self, dir: Direction) -> u32 {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

/// Layout of the character spritesheets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Sheet drawn while standing.
    pub idle: SheetConfig,
    /// Sheet drawn while a direction is held.
    pub walk: SheetConfig,
    /// Frame width in pixels.
    pub frame_w: f32,
    /// Frame height in pixels.
    pub frame_h: f32,
    /// Row per facing direction.
    pub rows: DirectionRows,
    /// Direction drawn by mirroring another direction's row.
    pub mirrored: Option<Direction>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            idle: SheetConfig {
                path: PathBuf::from("movements/Idle.png"),
                columns: 4,
                directional: false,
            },
            walk: SheetConfig {
                path: PathBuf::from("movements/Walk.png"),
                columns: 6,
                directional: true,
            },
            frame_w: 32.0,
            frame_h: 32.0,
            rows: DirectionRows::default(),
            mirrored: Some(Direction::Left),
        }
    }
}

/// Where the character starts and how fast its sprite animates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Starting cell.
    pub spawn: GridPos,
    /// Duration of one sprite frame.
    pub frame_ms: f64,
    /// Sprite frames per cycle.
    pub frame_count: usize,
    /// `None` renders the map without a character.
    pub sprites: Option<SpriteConfig>,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            spawn: GridPos::new(0, 0),
            frame_ms: 150.0,
            frame_count: 4,
            sprites: None,
        }
    }
}

/// Everything tunable about a walker session.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Speed and cooldown.
    pub movement: MovementConfig,
    /// Spawn and sprites.
    pub character: CharacterConfig,
    /// Terrain rules.
    pub walk: WalkRules,
    /// Atlas column counts keyed by tileset name.
    pub column_overrides: ColumnOverrides,
    /// Animations added on top of the tilesets' own.
    pub animations: Vec<AnimationRule>,
    /// Draws the position panel in debug builds.
    pub debug_overlay: bool,
}

impl WalkerConfig {
    /// Parses a config document; missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a config file; relative sprite paths become relative to it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let p = path.as_ref();
        let txt = std::fs::read_to_string(p).map_err(|e| MapError::io(p, e))?;
        let mut config = Self::from_json_str(&txt).map_err(|source| MapError::Config {
            path: p.to_path_buf(),
            source,
        })?;

        if let (Some(dir), Some(sprites)) = (p.parent(), config.character.sprites.as_mut()) {
            for sheet in [&mut sprites.idle, &mut sprites.walk] {
                if sheet.path.is_relative() {
                    sheet.path = dir.join(&sheet.path);
                }
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::GridRect;

    #[test]
    fn empty_object_gives_defaults() {
        let config = WalkerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WalkerConfig::default());
        assert_eq!(config.movement.speed_cells_per_ms, 0.008);
        assert_eq!(config.movement.cooldown_ms, 150.0);
        assert_eq!(config.walk.water_walkable, vec![62]);
        assert!(config.character.sprites.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = WalkerConfig::from_json_str(
            r#"{
              "movement": {"cooldown_ms": 90},
              "character": {"spawn": {"x": 35, "y": 24}, "sprites": {"frame_w": 48}},
              "walk": {"safe_zones": [{"min": {"x": 33, "y": 8}, "max": {"x": 70, "y": 35}}]},
              "column_overrides": {"water-2": 7, "Tileset Grass Spring": 25},
              "debug_overlay": true
            }"#,
        )
        .unwrap();

        assert_eq!(config.movement.cooldown_ms, 90.0);
        assert_eq!(config.movement.speed_cells_per_ms, 0.008);
        assert_eq!(config.character.spawn, GridPos::new(35, 24));
        let sprites = config.character.sprites.as_ref().unwrap();
        assert_eq!(sprites.frame_w, 48.0);
        assert_eq!(sprites.walk.columns, 6);
        assert_eq!(sprites.mirrored, Some(Direction::Left));
        assert_eq!(
            config.walk.safe_zones,
            vec![GridRect { min: GridPos::new(33, 8), max: GridPos::new(70, 35) }]
        );
        assert_eq!(config.walk.roles.obstacle.len(), 3);
        assert_eq!(config.column_overrides.get("water-2"), Some(&7));
        assert!(config.debug_overlay);
    }

    #[test]
    fn from_file_resolves_sprite_paths() {
        let dir = std::env::temp_dir().join(format!("mq_walker_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("walker.json");
        std::fs::write(&path, r#"{"character":{"sprites":{"idle":{"path":"idle.png","columns":4}}}}"#).unwrap();

        let config = WalkerConfig::from_file(&path).unwrap();
        let sprites = config.character.sprites.unwrap();
        assert_eq!(sprites.idle.path, dir.join("idle.png"));
        assert_eq!(sprites.walk.path, dir.join("movements/Walk.png"));

        let err = WalkerConfig::from_file(dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let dir = std::env::temp_dir().join(format!("mq_walker_bad_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("walker.json");
        std::fs::write(&path, r#"{"movement":{"cooldown_ms":"soon"}}"#).unwrap();

        match WalkerConfig::from_file(&path) {
            Err(MapError::Config { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn demo_config_lets_land_override_obstacles() {
        let config = WalkerConfig::from_json_str(include_str!("../demos/walker.json")).unwrap();
        assert!(config.walk.land_overrides_obstacles);
        assert_eq!(config.character.spawn, GridPos::new(35, 24));
        assert_eq!(config.animations.len(), 7);
    }
}
