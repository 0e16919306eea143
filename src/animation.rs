//! Per-tile animation schedule.
//!
//! Every animated gid owns an [`AnimationState`] that is advanced by the
//! wall-clock delta of each frame. Entries are built once when a map is
//! loaded and never removed.

use crate::map::{TileMap, Tileset};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One frame of a scheduled animation, in global ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Gid drawn while this frame is active.
    pub tile_id: u32,
    /// How long the frame stays up, in milliseconds.
    pub duration_ms: f64,
}

/// Playback state of a single animated gid.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    frames: Vec<Frame>,
    current: usize,
    elapsed_ms: f64,
    cycle_ms: f64,
}

impl AnimationState {
    /// Returns `None` for an empty frame list.
    pub fn new(mut frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        for f in &mut frames {
            f.duration_ms = f.duration_ms.max(0.0);
        }
        let cycle_ms = frames.iter().map(|f| f.duration_ms).sum();
        Some(Self {
            frames,
            current: 0,
            elapsed_ms: 0.0,
            cycle_ms,
        })
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Index of the active frame.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Time spent on the active frame so far.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Sum of all frame durations.
    pub fn cycle_ms(&self) -> f64 {
        self.cycle_ms
    }

    /// None
    pub fn current_frame(&self) -> Frame {
        self.frames[self.current]
    }

    /// Consumes `delta_ms`, stepping over as many frames as it covers.
    pub fn advance(&mut self, delta_ms: f64) {
        // A cycle with no duration would spin forever; an infinite delta
        // has no residual.
        if self.cycle_ms <= 0.0 || !(delta_ms > 0.0) || !delta_ms.is_finite() {
            return;
        }
        self.elapsed_ms += delta_ms;

        // Whole cycles land back on the same frame with the same residual.
        if self.elapsed_ms >= self.cycle_ms {
            self.elapsed_ms %= self.cycle_ms;
        }

        while self.elapsed_ms >= self.frames[self.current].duration_ms {
            self.elapsed_ms -= self.frames[self.current].duration_ms;
            self.current = (self.current + 1) % self.frames.len();
        }
    }
}

/// Engine-side animation rules for assets that ship without (complete)
/// animation data. Keyed by tileset name; ids are tileset-local.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationRule {
    /// Tile `base` cycles through `base + offset` for every offset.
    Offsets {
        /// Name of the tileset the ids belong to.
        tileset: String,
        /// Local id of the animated tile.
        base: u32,
        /// Frame ids relative to `base`.
        offsets: Vec<u32>,
        /// Duration of every frame.
        duration_ms: u32,
    },
    /// Every tile of the tileset cycles through its first `frames` tiles.
    Strip {
        /// Name of the tileset the ids belong to.
        tileset: String,
        /// Length of the strip.
        frames: u32,
        /// Duration of every frame.
        duration_ms: u32,
    },
}

impl AnimationRule {
    fn tileset(&self) -> &str {
        match self {
            AnimationRule::Offsets { tileset, .. } | AnimationRule::Strip { tileset, .. } => tileset,
        }
    }

    /// Expands the rule into `(gid, frames)` entries for `ts`. Ids that
    /// overflow the gid range are skipped.
    fn expand(&self, ts: &Tileset) -> Vec<(u32, Vec<Frame>)> {
        let duration = |ms: &u32| f64::from(*ms);
        match self {
            AnimationRule::Offsets {
                base,
                offsets,
                duration_ms,
                ..
            } => {
                let Some(gid) = ts.first_gid.checked_add(*base) else {
                    return Vec::new();
                };
                let frames = offsets
                    .iter()
                    .filter_map(|off| gid.checked_add(*off))
                    .map(|tile_id| Frame {
                        tile_id,
                        duration_ms: duration(duration_ms),
                    })
                    .collect();
                vec![(gid, frames)]
            }
            AnimationRule::Strip {
                frames,
                duration_ms,
                ..
            } => {
                let strip: Vec<Frame> = (0..*frames)
                    .filter_map(|i| ts.first_gid.checked_add(i))
                    .map(|tile_id| Frame {
                        tile_id,
                        duration_ms: duration(duration_ms),
                    })
                    .collect();
                (0..ts.tilecount)
                    .filter_map(|local| ts.first_gid.checked_add(local))
                    .map(|gid| (gid, strip.clone()))
                    .collect()
            }
        }
    }
}

/// Tracks every animated gid of a map.
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    states: BTreeMap<u32, AnimationState>,
}

impl AnimationScheduler {
    /// An empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports the tilesets' own animations, then fills in `rules` for ids
    /// that have none yet. Existing entries are never overwritten.
    pub fn from_map(map: &TileMap, rules: &[AnimationRule]) -> Self {
        let mut scheduler = Self::new();

        for ts in &map.tilesets {
            for (local, defs) in &ts.animations {
                let Some(gid) = ts.first_gid.checked_add(*local) else {
                    continue;
                };
                let frames = defs
                    .iter()
                    .filter_map(|f| {
                        ts.first_gid.checked_add(f.local_id).map(|tile_id| Frame {
                            tile_id,
                            duration_ms: f64::from(f.duration_ms),
                        })
                    })
                    .collect();
                scheduler.insert_if_absent(gid, frames);
            }
        }

        for rule in rules {
            let Some(ts) = map.tileset_by_name(rule.tileset()) else {
                debug!("animation rule for unknown tileset '{}' skipped", rule.tileset());
                continue;
            };
            for (gid, frames) in rule.expand(ts) {
                scheduler.insert_if_absent(gid, frames);
            }
        }

        debug!("animation scheduler tracks {} tiles", scheduler.len());
        scheduler
    }

    /// Adds an animation for `gid` unless one is already tracked.
    /// Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, gid: u32, frames: Vec<Frame>) -> bool {
        if self.states.contains_key(&gid) {
            return false;
        }
        match AnimationState::new(frames) {
            Some(state) => {
                self.states.insert(gid, state);
                true
            }
            None => {
                warn!("animation for gid {gid} has no frames");
                false
            }
        }
    }

    /// Advances every tracked animation by `delta_ms`.
    pub fn advance(&mut self, delta_ms: f64) {
        for state in self.states.values_mut() {
            state.advance(delta_ms);
        }
    }

    /// The gid to draw for `gid`: its active frame when animated, else itself.
    pub fn current_target(&self, gid: u32) -> u32 {
        self.states
            .get(&gid)
            .map(|s| s.current_frame().tile_id)
            .unwrap_or(gid)
    }

    /// Playback state for `gid`, if it is animated.
    pub fn state(&self, gid: u32) -> Option<&AnimationState> {
        self.states.get(&gid)
    }

    /// Number of animated gids.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// `true` when nothing is animated.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
