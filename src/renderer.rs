//! One frame of the walker: advance time, apply input, draw.

use crate::animation::AnimationScheduler;
use crate::camera::{compute_offset, TileWindow};
use crate::config::{SpriteConfig, WalkerConfig};
use crate::map::{TileId, TileMap};
use crate::movement::{Character, Direction, MoveOutcome, MovementController};
use crate::resolver::{TileResolver, TilesetImages};
use crate::surface::{DrawOptions, Surface};
use log::trace;
use macroquad::prelude::*;

/// Loaded character sheets plus their layout.
#[derive(Debug, Clone)]
pub struct CharacterSprites<I> {
    /// Idle sheet.
    pub idle: I,
    /// Walk sheet.
    pub walk: I,
    /// Frame size and rows of both sheets.
    pub layout: SpriteConfig,
}

/// Owns the map and all per-frame state; only [`FrameRenderer::tick`]
/// (and the `update`/`draw` halves it is made of) mutates it.
pub struct FrameRenderer<I> {
    map: TileMap,
    scheduler: AnimationScheduler,
    resolver: TileResolver,
    images: TilesetImages<I>,
    sprites: Option<CharacterSprites<I>>,
    character: Character,
    movement: MovementController,
    cooldown_ms: f64,
    frame_ms: f64,
    frame_count: usize,
    debug_overlay: bool,
    intents: [bool; 4],
    since_move_ms: f64,
}

impl<I> FrameRenderer<I> {
    /// Builds the schedule, resolver and character for `map` from `config`.
    pub fn new(
        map: TileMap,
        images: TilesetImages<I>,
        sprites: Option<CharacterSprites<I>>,
        config: &WalkerConfig,
    ) -> Self {
        let scheduler = AnimationScheduler::from_map(&map, &config.animations);
        Self {
            scheduler,
            resolver: TileResolver::new(config.column_overrides.clone()),
            images,
            sprites,
            character: Character::new(config.character.spawn),
            movement: MovementController::new(config.movement.speed_cells_per_ms, config.walk.clone()),
            cooldown_ms: config.movement.cooldown_ms,
            frame_ms: config.character.frame_ms,
            frame_count: config.character.frame_count,
            debug_overlay: config.debug_overlay,
            intents: [false; 4],
            // The first intent moves immediately.
            since_move_ms: config.movement.cooldown_ms,
            map,
        }
    }

    /// The loaded map.
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Tile animation state.
    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// The walking character.
    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Movement rules and speed.
    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    /// Registers that `dir` is held during the coming tick. Intents are
    /// consumed (or dropped) by the next [`update`](Self::update).
    pub fn on_directional_intent(&mut self, dir: Direction) {
        self.intents[dir.index()] = true;
    }

    fn take_intent(&mut self) -> Option<Direction> {
        let intents = std::mem::take(&mut self.intents);
        Direction::ALL.into_iter().find(|d| intents[d.index()])
    }

    /// Advances sprite frames, tile animations and movement by `delta_ms`,
    /// then applies this tick's intent.
    pub fn update(&mut self, delta_ms: f64) {
        let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };

        self.character.tick_frame(delta_ms, self.frame_ms, self.frame_count);
        self.scheduler.advance(delta_ms);
        self.movement.advance(&mut self.character, delta_ms);

        self.since_move_ms += delta_ms;
        let intent = self.take_intent();
        if self.character.is_moving() {
            return;
        }
        match intent {
            Some(dir) if self.since_move_ms >= self.cooldown_ms => {
                self.character.walking = true;
                let outcome = self.movement.try_move(&mut self.character, &self.map, dir);
                if outcome == MoveOutcome::Started || outcome == MoveOutcome::Snapped {
                    trace!("moving {dir} to {}", self.character.target());
                }
                self.since_move_ms = 0.0;
            }
            Some(_) => {}
            None => self.character.walking = false,
        }
    }

    /// Top-left map pixel shown at the surface origin.
    pub fn camera_offset(&self, viewport: Vec2) -> Vec2 {
        let focus = self.character.visual() * self.map.tile_size();
        compute_offset(focus, viewport, self.map.pixel_size())
    }

    /// Draws the current state; does not advance time.
    pub fn draw<S: Surface<Image = I>>(&self, surface: &mut S) {
        let viewport = surface.size();
        let offset = self.camera_offset(viewport);

        surface.clear();
        self.draw_layers(surface, offset, viewport);
        self.draw_character(surface, offset);

        if self.debug_overlay && cfg!(debug_assertions) {
            surface.draw_debug_panel(&self.debug_lines());
        }
    }

    /// One full frame: [`update`](Self::update) then [`draw`](Self::draw).
    pub fn tick<S: Surface<Image = I>>(&mut self, delta_ms: f64, surface: &mut S) {
        self.update(delta_ms);
        self.draw(surface);
    }

    fn draw_layers<S: Surface<Image = I>>(&self, surface: &mut S, offset: Vec2, viewport: Vec2) {
        let tile = self.map.tile_size();
        let window = TileWindow::new(offset, viewport, tile, (self.map.width, self.map.height));

        for layer in self.map.visible_tile_layers() {
            for (x, y) in window.cells() {
                let gid = layer.gid_at(x, y);
                if TileId(gid).is_empty() {
                    continue;
                }
                let Some(resolved) = self.resolver.resolve(gid, &self.map, &self.scheduler, &self.images) else {
                    continue;
                };
                // Tiles taller than the grid grow upwards from the cell's bottom edge.
                let dest = vec2(x as f32 * tile.x, y as f32 * tile.y + tile.y - resolved.source.h)
                    + layer.offset
                    - offset;
                surface.draw_image(
                    resolved.image,
                    resolved.source,
                    dest,
                    DrawOptions {
                        opacity: layer.opacity,
                        flip_x: resolved.flip_x,
                        flip_y: resolved.flip_y,
                    },
                );
            }
        }
    }

    fn draw_character<S: Surface<Image = I>>(&self, surface: &mut S, offset: Vec2) {
        let Some(sprites) = &self.sprites else {
            return;
        };
        let layout = &sprites.layout;
        let ch = &self.character;
        let (image, sheet) = if ch.walking {
            (&sprites.walk, &layout.walk)
        } else {
            (&sprites.idle, &layout.idle)
        };

        let col = ch.frame() % sheet.columns.max(1);
        let row = if sheet.directional { layout.rows.row(ch.facing) } else { 0 };
        let source = Rect::new(
            col as f32 * layout.frame_w,
            row as f32 * layout.frame_h,
            layout.frame_w,
            layout.frame_h,
        );

        // Centred on the cell horizontally, feet on its bottom edge.
        let tile = self.map.tile_size();
        let dest = ch.visual() * tile - offset
            - vec2((layout.frame_w - tile.x) / 2.0, layout.frame_h - tile.y);

        surface.draw_image(
            image,
            source,
            dest,
            DrawOptions {
                flip_x: layout.mirrored == Some(ch.facing),
                ..DrawOptions::default()
            },
        );
    }

    fn debug_lines(&self) -> Vec<String> {
        let ch = &self.character;
        let visual = ch.visual();
        vec![
            format!("Grid Pos: {}", ch.grid()),
            format!("Visual Pos: ({:.2}, {:.2})", visual.x, visual.y),
            format!("Direction: {}", ch.facing),
            format!("Movement: {:.0}%", ch.progress() * 100.0),
        ]
    }
}
