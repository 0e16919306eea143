use macroquad::prelude::*;

/// Per-draw options for [`Surface::draw_image`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawOptions {
    /// Alpha multiplier.
    pub opacity: f32,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Mirror vertically.
    pub flip_y: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// Where a frame is drawn. The renderer only talks to this trait, so it runs
/// against macroquad in the game and against a recorder in tests.
pub trait Surface {
    /// Image handle type the surface can draw.
    type Image;

    /// Viewport size in pixels.
    fn size(&self) -> Vec2;

    /// Starts a new frame.
    fn clear(&mut self);

    /// Copies `source` from `image` to `dest` (top-left, pixels), unscaled.
    fn draw_image(&mut self, image: &Self::Image, source: Rect, dest: Vec2, options: DrawOptions);

    /// Diagnostic text panel in the top-left corner.
    fn draw_debug_panel(&mut self, lines: &[String]);
}

/// Draws straight to the macroquad window.
#[derive(Debug, Default)]
pub struct MacroquadSurface {
    /// Clear colour; black when unset.
    pub background: Option<Color>,
}

impl Surface for MacroquadSurface {
    type Image = Texture2D;

    fn size(&self) -> Vec2 {
        vec2(screen_width(), screen_height())
    }

    fn clear(&mut self) {
        clear_background(self.background.unwrap_or(BLACK));
    }

    fn draw_image(&mut self, image: &Texture2D, source: Rect, dest: Vec2, options: DrawOptions) {
        draw_texture_ex(
            image,
            dest.x,
            dest.y,
            Color::new(1.0, 1.0, 1.0, options.opacity),
            DrawTextureParams {
                source: Some(source),
                flip_x: options.flip_x,
                flip_y: options.flip_y,
                ..Default::default()
            },
        );
    }

    fn draw_debug_panel(&mut self, lines: &[String]) {
        let height = 20.0 * lines.len() as f32 + 10.0;
        draw_rectangle(10.0, 10.0, 300.0, height, Color::new(0.0, 0.0, 0.0, 0.7));
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, 20.0, 30.0 + 20.0 * i as f32, 18.0, WHITE);
        }
    }
}
