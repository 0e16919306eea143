use macroquad::prelude::*;
use std::ops::Range;

/// Top-left pixel of the viewport that centres `focus`, clamped so the view
/// never leaves the map. On an axis where the map is smaller than the
/// viewport the offset is pinned to 0: the map stays top/left aligned.
pub fn compute_offset(focus: Vec2, viewport: Vec2, map_px: Vec2) -> Vec2 {
    let centred = (focus - viewport / 2.0).floor();
    let max = (map_px - viewport).max(Vec2::ZERO);
    centred.clamp(Vec2::ZERO, max)
}

/// Tiles touched by a viewport on one axis, as `start..end`. The end is
/// padded by one tile so partially visible edge tiles don't pop in, then
/// clamped to the map.
pub fn visible_tile_range(offset: f32, viewport: f32, tile: f32, count: usize) -> Range<usize> {
    if tile <= 0.0 || count == 0 {
        return 0..0;
    }
    let start = (offset.max(0.0) / tile).floor() as usize;
    let span = (viewport.max(0.0) / tile).ceil() as usize + 1;
    let end = start.saturating_add(span).min(count);
    start.min(end)..end
}

/// Both axes of [`visible_tile_range`] at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileWindow {
    /// Visible columns.
    pub xs: Range<usize>,
    /// Visible rows.
    pub ys: Range<usize>,
}

impl TileWindow {
    /// Window for a camera at `offset` over a map of `map_tiles` cells.
    pub fn new(offset: Vec2, viewport: Vec2, tile: Vec2, map_tiles: (usize, usize)) -> Self {
        Self {
            xs: visible_tile_range(offset.x, viewport.x, tile.x, map_tiles.0),
            ys: visible_tile_range(offset.y, viewport.y, tile.y, map_tiles.1),
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ys
            .clone()
            .flat_map(move |y| self.xs.clone().map(move |x| (x, y)))
    }
}
