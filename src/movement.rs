//! Grid movement: walkability rules and the per-cell movement state machine.
//!
//! A character is either idle on its grid cell or moving towards an adjacent
//! target cell. Moves are atomic: intents that arrive mid-move are dropped,
//! and the grid position only changes once the interpolation completes.

use crate::map::{TileId, TileLayer, TileMap};
use log::debug;
use macroquad::prelude::*;
use serde::Deserialize;
use std::fmt;

/// Progress this close to 1 counts as arrived; absorbs float error in
/// `elapsed * speed` when `elapsed` is computed as `1 / speed`.
const ARRIVAL_EPSILON: f64 = 1e-6;

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// Sampling priority when several directions are held at once.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Cell offset of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Position in [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// A cell, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Cell `(x, y)`.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbour in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Same cell as a float vector.
    pub fn as_vec2(self) -> Vec2 {
        vec2(self.x as f32, self.y as f32)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridRect {
    /// Top-left cell.
    pub min: GridPos,
    /// Bottom-right cell.
    pub max: GridPos,
}

impl GridRect {
    /// `true` when `p` lies inside, edges included.
    pub fn contains(&self, p: GridPos) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// What a terrain layer means for movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRole {
    /// Ground; only listed tiles are walkable.
    Land,
    /// Blocks unless the tile is listed walkable.
    Water,
    /// Any tile blocks.
    Obstacle,
}

/// How layers are assigned roles. A layer whose `property` custom property
/// names a role has exactly that role; otherwise its name is matched
/// case-insensitively against each role's substrings, and may match several.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerRoles {
    /// Custom property that declares a role outright.
    pub property: String,
    /// Name substrings of land layers.
    pub land: Vec<String>,
    /// Name substrings of water layers.
    pub water: Vec<String>,
    /// Name substrings of obstacle layers.
    pub obstacle: Vec<String>,
}

impl Default for LayerRoles {
    fn default() -> Self {
        Self {
            property: "role".into(),
            land: vec!["land".into()],
            water: vec!["water".into()],
            obstacle: vec!["farm".into(), "hous".into(), "obstacle".into()],
        }
    }
}

impl LayerRoles {
    fn patterns(&self, role: LayerRole) -> &[String] {
        match role {
            LayerRole::Land => &self.land,
            LayerRole::Water => &self.water,
            LayerRole::Obstacle => &self.obstacle,
        }
    }

    /// `true` when `layer` plays `role`.
    pub fn has_role(&self, layer: &TileLayer, role: LayerRole) -> bool {
        if let Some(declared) = layer.properties.get_string(&self.property) {
            return match declared.to_ascii_lowercase().as_str() {
                "land" => role == LayerRole::Land,
                "water" => role == LayerRole::Water,
                "obstacle" => role == LayerRole::Obstacle,
                _ => false,
            };
        }
        let name = layer.name.to_lowercase();
        self.patterns(role)
            .iter()
            .any(|p| name.contains(&p.to_lowercase()))
    }
}

/// Why a cell rejected a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    /// The cell lies outside the map.
    OutOfBounds,
    /// A water layer has a non-walkable tile there.
    Water {
        /// Layer holding the tile.
        layer: String,
        /// The tile, flip flags stripped.
        gid: u32,
    },
    /// An obstacle layer has any tile there.
    Obstacle {
        /// Layer holding the tile.
        layer: String,
        /// The tile, flip flags stripped.
        gid: u32,
    },
    /// A land layer has a tile outside the walkable list there.
    Land {
        /// Layer holding the tile.
        layer: String,
        /// The tile, flip flags stripped.
        gid: u32,
    },
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocked::OutOfBounds => write!(f, "out of bounds"),
            Blocked::Water { layer, gid } => write!(f, "water tile {gid} on '{layer}'"),
            Blocked::Obstacle { layer, gid } => write!(f, "obstacle tile {gid} on '{layer}'"),
            Blocked::Land { layer, gid } => write!(f, "non-walkable land tile {gid} on '{layer}'"),
        }
    }
}

/// Terrain rules deciding which cells can be entered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkRules {
    /// How layers get their roles.
    pub roles: LayerRoles,
    /// Tiles on a water layer that can be walked on anyway.
    pub water_walkable: Vec<u32>,
    /// Tiles on a land layer that can be walked on; empty cells always can.
    pub land_walkable: Vec<u32>,
    /// Cells inside any of these are walkable whatever the layers say.
    pub safe_zones: Vec<GridRect>,
    /// A walkable land tile overrides water and obstacle layers.
    pub land_overrides_obstacles: bool,
}

impl Default for WalkRules {
    fn default() -> Self {
        Self {
            roles: LayerRoles::default(),
            water_walkable: vec![62],
            land_walkable: vec![62],
            safe_zones: Vec::new(),
            land_overrides_obstacles: false,
        }
    }
}

impl WalkRules {
    fn layers<'m>(&'m self, map: &'m TileMap, role: LayerRole) -> impl Iterator<Item = &'m TileLayer> + 'm {
        map.visible_tile_layers()
            .filter(move |l| self.roles.has_role(l, role))
    }

    /// `Ok` when `cell` can be entered.
    pub fn check(&self, map: &TileMap, cell: GridPos) -> Result<(), Blocked> {
        if !map.in_bounds(cell.x, cell.y) {
            return Err(Blocked::OutOfBounds);
        }
        if self.safe_zones.iter().any(|z| z.contains(cell)) {
            return Ok(());
        }

        let (x, y) = (cell.x as usize, cell.y as usize);
        let gid_at = |layer: &TileLayer| TileId(layer.gid_at(x, y)).clean();

        if self.land_overrides_obstacles
            && self
                .layers(map, LayerRole::Land)
                .any(|l| self.land_walkable.contains(&gid_at(l)))
        {
            return Ok(());
        }

        for layer in self.layers(map, LayerRole::Water) {
            let gid = gid_at(layer);
            if gid != 0 && !self.water_walkable.contains(&gid) {
                return Err(Blocked::Water { layer: layer.name.clone(), gid });
            }
        }
        for layer in self.layers(map, LayerRole::Obstacle) {
            let gid = gid_at(layer);
            if gid != 0 {
                return Err(Blocked::Obstacle { layer: layer.name.clone(), gid });
            }
        }
        for layer in self.layers(map, LayerRole::Land) {
            let gid = gid_at(layer);
            if gid != 0 && !self.land_walkable.contains(&gid) {
                return Err(Blocked::Land { layer: layer.name.clone(), gid });
            }
        }
        Ok(())
    }

    /// `true` when `cell` can be entered.
    pub fn is_walkable(&self, map: &TileMap, cell: GridPos) -> bool {
        self.check(map, cell).is_ok()
    }
}

/// Whether a move is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    /// Standing on the grid cell.
    Idle,
    /// Interpolating towards the target cell.
    Moving,
}

/// Result of a directional intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Interpolation towards the new cell has begun.
    Started,
    /// Infinite speed: the character is already on the new cell.
    Snapped,
    /// The target cell can't be entered.
    Blocked(Blocked),
    /// A move is in flight; the intent was dropped.
    Busy,
}

/// The player character's logical and visual state.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    grid: GridPos,
    target: GridPos,
    visual: Vec2,
    progress: f64,
    move_elapsed_ms: f64,
    /// Direction of the last intent.
    pub facing: Direction,
    /// A direction was held on the last tick.
    pub walking: bool,
    frame: usize,
    frame_elapsed_ms: f64,
}

impl Character {
    /// An idle character on `spawn`, facing down.
    pub fn new(spawn: GridPos) -> Self {
        Self {
            grid: spawn,
            target: spawn,
            visual: spawn.as_vec2(),
            progress: 1.0,
            move_elapsed_ms: 0.0,
            facing: Direction::Down,
            walking: false,
            frame: 0,
            frame_elapsed_ms: 0.0,
        }
    }

    /// Committed cell.
    pub fn grid(&self) -> GridPos {
        self.grid
    }

    /// Cell being moved to; equals `grid` when idle.
    pub fn target(&self) -> GridPos {
        self.target
    }

    /// Interpolated position in cells.
    pub fn visual(&self) -> Vec2 {
        self.visual
    }

    /// Fraction of the current move done, 1 when idle.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Idle or moving.
    pub fn state(&self) -> MoveState {
        if self.progress < 1.0 {
            MoveState::Moving
        } else {
            MoveState::Idle
        }
    }

    /// `true` while a move is in flight.
    pub fn is_moving(&self) -> bool {
        self.state() == MoveState::Moving
    }

    /// Sprite animation frame.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Steps the sprite frame counter on its own cadence.
    pub fn tick_frame(&mut self, delta_ms: f64, frame_ms: f64, frame_count: usize) {
        if frame_count == 0 || frame_ms <= 0.0 {
            return;
        }
        self.frame_elapsed_ms += delta_ms.max(0.0);
        while self.frame_elapsed_ms >= frame_ms {
            self.frame_elapsed_ms -= frame_ms;
            self.frame = (self.frame + 1) % frame_count;
        }
    }
}

/// Validates and interpolates moves between adjacent cells.
#[derive(Debug, Clone)]
pub struct MovementController {
    speed: f64, // cells per ms; infinity snaps
    rules: WalkRules,
}

impl MovementController {
    /// Controller moving `speed` cells per ms; non-positive speeds snap.
    pub fn new(speed: f64, rules: WalkRules) -> Self {
        let speed = if speed > 0.0 {
            speed
        } else {
            debug!("movement speed {speed} is not positive, moves snap");
            f64::INFINITY
        };
        Self { speed, rules }
    }

    /// Cells per millisecond.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Terrain rules in use.
    pub fn rules(&self) -> &WalkRules {
        &self.rules
    }

    /// `true` when `cell` can be entered.
    pub fn is_walkable(&self, map: &TileMap, cell: GridPos) -> bool {
        self.rules.is_walkable(map, cell)
    }

    /// Handles one directional intent. Facing follows the intent even when
    /// the move is rejected.
    pub fn try_move(&self, ch: &mut Character, map: &TileMap, dir: Direction) -> MoveOutcome {
        if ch.is_moving() {
            return MoveOutcome::Busy;
        }
        ch.facing = dir;

        let candidate = ch.grid.step(dir);
        if let Err(reason) = self.rules.check(map, candidate) {
            debug!("move {dir} from {} to {candidate} rejected: {reason}", ch.grid);
            return MoveOutcome::Blocked(reason);
        }

        ch.target = candidate;
        ch.move_elapsed_ms = 0.0;
        if self.speed.is_infinite() {
            ch.grid = candidate;
            ch.visual = candidate.as_vec2();
            ch.progress = 1.0;
            return MoveOutcome::Snapped;
        }
        ch.progress = 0.0;
        MoveOutcome::Started
    }

    /// Moves the interpolation forward; commits the grid cell on arrival.
    pub fn advance(&self, ch: &mut Character, delta_ms: f64) {
        if !ch.is_moving() {
            return;
        }
        ch.move_elapsed_ms += delta_ms.max(0.0);
        ch.progress = ch.move_elapsed_ms * self.speed;
        if ch.progress >= 1.0 - ARRIVAL_EPSILON {
            ch.progress = 1.0;
        }

        let from = ch.grid.as_vec2();
        let to = ch.target.as_vec2();
        ch.visual = from + (to - from) * ch.progress as f32;

        if ch.progress >= 1.0 {
            ch.grid = ch.target;
            ch.visual = to;
        }
    }
}
