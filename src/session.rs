use crate::assets::{load_character_sprites, load_tileset_images};
use crate::config::WalkerConfig;
use crate::error::MapError;
use crate::loader::json_loader::decode_map_file;
use crate::movement::Direction;
use crate::renderer::FrameRenderer;
use crate::surface::MacroquadSurface;
use log::{error, info};
use macroquad::prelude::*;
use std::path::Path;

const KEYS: [(Direction, [KeyCode; 2]); 4] = [
    (Direction::Up, [KeyCode::Up, KeyCode::W]),
    (Direction::Down, [KeyCode::Down, KeyCode::S]),
    (Direction::Left, [KeyCode::Left, KeyCode::A]),
    (Direction::Right, [KeyCode::Right, KeyCode::D]),
];

/// Directions whose arrow or WASD key is currently held.
pub fn held_directions() -> impl Iterator<Item = Direction> {
    KEYS.into_iter()
        .filter(|(_, keys)| keys.iter().any(|k| is_key_down(*k)))
        .map(|(dir, _)| dir)
}

/// A map loaded into a macroquad window and the loop that drives it.
pub struct WalkerSession {
    config: WalkerConfig,
    renderer: Option<FrameRenderer<Texture2D>>,
    surface: MacroquadSurface,
    running: bool,
}

impl WalkerSession {
    /// A session with no map loaded.
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            renderer: None,
            surface: MacroquadSurface::default(),
            running: false,
        }
    }

    /// The loaded map and its state.
    pub fn renderer(&self) -> Option<&FrameRenderer<Texture2D>> {
        self.renderer.as_ref()
    }

    /// Loads the map, its tileset images and the character sheets.
    pub async fn try_load_map(&self, path: impl AsRef<Path>) -> Result<FrameRenderer<Texture2D>, MapError> {
        let map = decode_map_file(path.as_ref())?;
        let images = load_tileset_images(&map).await?;
        let sprites = match &self.config.character.sprites {
            Some(layout) => Some(load_character_sprites(layout).await?),
            None => None,
        };
        info!(
            "map {} loaded: {}x{} tiles, {} layers, {} tilesets",
            path.as_ref().display(),
            map.width,
            map.height,
            map.layers.len(),
            map.tilesets.len()
        );
        Ok(FrameRenderer::new(map, images, sprites, &self.config))
    }

    /// Replaces the current map. On failure the previous map (if any) stays
    /// and the error is logged.
    pub async fn load_map(&mut self, path: impl AsRef<Path>) -> bool {
        match self.try_load_map(path.as_ref()).await {
            Ok(renderer) => {
                info!("animated tiles: {}", renderer.scheduler().len());
                self.renderer = Some(renderer);
                true
            }
            Err(err) => {
                error!("failed to load map {}: {err}", path.as_ref().display());
                false
            }
        }
    }

    /// Arms the loop. Returns `false` when no map is loaded.
    pub fn start_loop(&mut self) -> bool {
        self.running = self.renderer.is_some();
        self.running
    }

    /// The current iteration finishes; no further one is scheduled.
    pub fn stop_loop(&mut self) {
        self.running = false;
    }

    /// `true` between `start_loop` and `stop_loop`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Forwards a held direction to the renderer.
    pub fn on_directional_intent(&mut self, dir: Direction) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.on_directional_intent(dir);
        }
    }

    /// Runs one frame per display refresh until [`stop_loop`](Self::stop_loop)
    /// or Escape.
    pub async fn run(&mut self) {
        self.run_with(|_| {}).await;
    }

    /// Like [`run`](Self::run), calling `on_frame` once per iteration after
    /// input is polled. The host can stop the loop from there.
    pub async fn run_with<F: FnMut(&mut Self)>(&mut self, mut on_frame: F) {
        while self.running {
            self.begin_frame(is_key_pressed(KeyCode::Escape), held_directions(), &mut on_frame);

            let delta_ms = f64::from(get_frame_time()) * 1000.0;
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.tick(delta_ms, &mut self.surface);
            }
            next_frame().await;
        }
    }

    fn begin_frame<F: FnMut(&mut Self)>(
        &mut self,
        escape: bool,
        held: impl IntoIterator<Item = Direction>,
        on_frame: &mut F,
    ) {
        if escape {
            self.stop_loop();
        }
        for dir in held {
            self.on_directional_intent(dir);
        }
        on_frame(self);
    }
}
