use image::RgbaImage;

pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];

/// CPU-side RGBA8 pixel buffer with a few drawing primitives. Coordinates
/// outside the canvas are clipped.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&background);
        }
        Self { width, height, pixels }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(out)
    }

    /// Alpha-blend `color` over the pixel at (x, y).
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;

        let a = color[3] as f32 / 255.0;
        let inv_a = 1.0 - a;
        for c in 0..3 {
            self.pixels[idx + c] = (color[c] as f32 * a + self.pixels[idx + c] as f32 * inv_a) as u8;
        }
        self.pixels[idx + 3] = 255;
    }

    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        for y in y0.max(0)..=y1.min(self.height as i32 - 1) {
            for x in x0.max(0)..=x1.min(self.width as i32 - 1) {
                self.blend(x, y, color);
            }
        }
    }

    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgba) {
        self.fill_rect(x0, y, x1, y, color);
    }

    pub fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Rgba) {
        self.fill_rect(x, y0, x, y1, color);
    }

    pub fn dashed_hline(&mut self, x0: i32, x1: i32, y: i32, dash: i32, color: Rgba) {
        let dash = dash.max(1);
        let mut x = x0.min(x1);
        let end = x0.max(x1);
        while x <= end {
            self.hline(x, (x + dash - 1).min(end), y, color);
            x += dash * 2;
        }
    }

    /// Bresenham line between two points, inclusive.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.blend(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.pixels)
            .unwrap_or_else(|| RgbaImage::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];

    #[test]
    fn new_canvas_is_filled() {
        let canvas = Canvas::new(4, 3, WHITE);
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
        assert_eq!(canvas.pixel(3, 2), Some(WHITE));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn opaque_blend_replaces_and_clips() {
        let mut canvas = Canvas::new(4, 4, WHITE);
        canvas.blend(1, 1, RED);
        canvas.blend(-1, 2, RED);
        canvas.blend(9, 9, RED);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(0, 2), Some(WHITE));
    }

    #[test]
    fn half_alpha_blend() {
        let mut canvas = Canvas::new(1, 1, [0, 0, 0, 255]);
        canvas.blend(0, 0, [200, 100, 50, 128]);
        let [r, g, b, a] = canvas.pixel(0, 0).unwrap();
        assert!((r as i32 - 100).abs() <= 1);
        assert!((g as i32 - 50).abs() <= 1);
        assert!((b as i32 - 25).abs() <= 1);
        assert_eq!(a, 255);
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.line(1, 8, 7, 2, RED);
        assert_eq!(canvas.pixel(1, 8), Some(RED));
        assert_eq!(canvas.pixel(7, 2), Some(RED));
        assert_eq!(canvas.pixel(4, 5), Some(RED));
    }

    #[test]
    fn rect_is_inclusive_and_clipped() {
        let mut canvas = Canvas::new(5, 5, WHITE);
        canvas.fill_rect(3, 3, 10, 10, RED);
        assert_eq!(canvas.pixel(3, 3), Some(RED));
        assert_eq!(canvas.pixel(4, 4), Some(RED));
        assert_eq!(canvas.pixel(2, 2), Some(WHITE));
    }

    #[test]
    fn image_has_canvas_size() {
        let image = Canvas::new(6, 2, WHITE).into_image();
        assert_eq!(image.dimensions(), (6, 2));
    }
}
