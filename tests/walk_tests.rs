// tests/walk_tests.rs

use std::path::Path;
use macroquad::prelude::{vec2, Rect, Vec2};
use macroquad_tiled_walker::{
    decode_map_str, Direction, DrawOptions, FrameRenderer, GridPos, Surface, TilesetImages,
    WalkerConfig,
};

#[derive(Default)]
struct CountingSurface {
    draws: usize,
}

impl Surface for CountingSurface {
    type Image = ();

    fn size(&self) -> Vec2 {
        vec2(320.0, 240.0)
    }

    fn clear(&mut self) {
        self.draws = 0;
    }

    fn draw_image(&mut self, _: &(), _: Rect, _: Vec2, _: DrawOptions) {
        self.draws += 1;
    }

    fn draw_debug_panel(&mut self, _: &[String]) {}
}

fn grass_field_json() -> String {
    let data = vec!["62"; 100].join(",");
    format!(
        r#"{{
          "width":10, "height":10, "tilewidth":16, "tileheight":16,
          "layers":[{{"type":"tilelayer","name":"Land","width":10,"height":10,"visible":true,"opacity":1,"data":[{data}]}}],
          "tilesets":[{{"firstgid":1,"name":"Tileset Grass Spring","tilewidth":16,"tileheight":16,
                        "tilecount":400,"columns":25,"image":"grass.png"}}]
        }}"#
    )
}

fn walker() -> FrameRenderer<()> {
    let map = decode_map_str(&grass_field_json(), Path::new(".")).expect("grass field");
    let mut images = TilesetImages::new();
    images.insert("Tileset Grass Spring".to_string(), ());
    FrameRenderer::new(map, images, None, &WalkerConfig::default())
}

/// Holds `dir` until a move starts, then waits for it to finish.
fn step(renderer: &mut FrameRenderer<()>, surface: &mut CountingSurface, dir: Direction) {
    let mut ticks = 0;
    while !renderer.character().is_moving() {
        renderer.on_directional_intent(dir);
        renderer.tick(16.0, surface);
        ticks += 1;
        assert!(ticks < 100, "move never started");
    }
    while renderer.character().is_moving() {
        renderer.tick(16.0, surface);
        ticks += 1;
        assert!(ticks < 200, "move never finished");
    }
}

#[test]
fn walking_right_three_times_ends_three_cells_over() {
    let mut renderer = walker();
    let mut surface = CountingSurface::default();
    assert_eq!(renderer.character().grid(), GridPos::new(0, 0));

    for _ in 0..3 {
        step(&mut renderer, &mut surface, Direction::Right);
    }

    assert_eq!(renderer.character().grid(), GridPos::new(3, 0));
    assert_eq!(renderer.character().visual(), vec2(3.0, 0.0));
    assert_eq!(renderer.character().facing, Direction::Right);
    // The whole 10x10 field fits in the viewport.
    assert_eq!(surface.draws, 100);
}

#[test]
fn walls_of_the_map_stop_the_walk() {
    let mut renderer = walker();
    let mut surface = CountingSurface::default();

    renderer.on_directional_intent(Direction::Left);
    renderer.tick(16.0, &mut surface);
    assert!(!renderer.character().is_moving());
    assert_eq!(renderer.character().grid(), GridPos::new(0, 0));
    assert_eq!(renderer.character().facing, Direction::Left);

    for _ in 0..12 {
        step_if_possible(&mut renderer, &mut surface, Direction::Down);
    }
    assert_eq!(renderer.character().grid(), GridPos::new(0, 9));
}

fn step_if_possible(renderer: &mut FrameRenderer<()>, surface: &mut CountingSurface, dir: Direction) {
    // Past the cooldown, so the intent is always sampled.
    renderer.tick(200.0, surface);
    renderer.on_directional_intent(dir);
    renderer.tick(0.0, surface);
    while renderer.character().is_moving() {
        renderer.tick(16.0, surface);
    }
}

#[test]
fn input_during_a_move_is_not_queued() {
    let mut renderer = walker();
    let mut surface = CountingSurface::default();

    renderer.on_directional_intent(Direction::Right);
    renderer.tick(16.0, &mut surface);
    assert!(renderer.character().is_moving());

    renderer.on_directional_intent(Direction::Down);
    renderer.tick(16.0, &mut surface);
    assert_eq!(renderer.character().target(), GridPos::new(1, 0));

    while renderer.character().is_moving() {
        renderer.tick(16.0, &mut surface);
    }
    renderer.tick(500.0, &mut surface);
    assert_eq!(renderer.character().grid(), GridPos::new(1, 0));
    assert!(!renderer.character().walking);
}
