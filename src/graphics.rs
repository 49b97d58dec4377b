use crate::error::SurfaceError;

/// Largest raster [`Canvas::for_viewport`] will allocate
pub const MAX_PIXELS: usize = 1 << 22;

/// Colour with 8-bit channels and a fractional alpha, as used by the palettes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: f64) -> Self {
        Rgba { a, ..self }
    }

    /// Channels normalized to 0..1
    fn unit(self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

/// Style of a stroked line segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

/// A 2D drawing target measured in simulation units
pub trait Surface {
    /// Erases everything drawn so far
    fn clear(&mut self);
    /// Fills a circle with the given colour
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba);
    /// Strokes a straight segment between two points
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], stroke: Stroke);
}

/// Raster drawing surface with a transparent, premultiplied-alpha layer.
///
/// Each pixel covers `scale` by `scale` simulation units.
pub struct Canvas {
    width: usize,
    height: usize,
    scale: f64,
    pixels: Vec<[f64; 4]>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, scale: f64) -> Self {
        Canvas {
            width,
            height,
            scale,
            pixels: vec![[0.0; 4]; width * height],
        }
    }

    /// Canvas covering `viewport` simulation units, rounded up to whole
    /// pixels
    pub fn for_viewport(viewport: [f64; 2], scale: f64) -> Result<Self, SurfaceError> {
        let [width, height] = viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SurfaceError::InvalidViewport { width, height });
        }
        let cols = (width / scale).ceil();
        let rows = (height / scale).ceil();
        // also false for NaN or infinite sizes from a degenerate scale
        if !(cols * rows <= MAX_PIXELS as f64) {
            return Err(SurfaceError::TooLarge {
                width,
                height,
                scale,
            });
        }
        Ok(Canvas::new(cols as usize, rows as usize, scale))
    }

    /// Viewport covered by the canvas, in simulation units
    pub fn viewport(&self) -> [f64; 2] {
        [self.width as f64 * self.scale, self.height as f64 * self.scale]
    }

    /// Premultiplied RGBA of a pixel, or `None` outside the canvas
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f64; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Final colour of a pixel with the layer drawn at `opacity` over an
    /// opaque background
    pub fn composite(&self, x: usize, y: usize, background: Rgba, opacity: f64) -> (u8, u8, u8) {
        let [r, g, b, a] = self.pixel(x, y).unwrap_or([0.0; 4]);
        let bg = background.unit();
        let coverage = a * opacity;
        let channel = |src: f64, dst: f64| {
            let value = src * opacity + dst * (1.0 - coverage);
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        (channel(r, bg[0]), channel(g, bg[1]), channel(b, bg[2]))
    }

    /// Source-over blends a colour into one pixel, ignoring out-of-bounds
    /// coordinates
    fn blend(&mut self, x: isize, y: isize, color: Rgba, alpha: f64) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let src = color.unit();
        let dst = &mut self.pixels[y as usize * self.width + x as usize];
        for channel in 0..3 {
            dst[channel] = src[channel] * alpha + dst[channel] * (1.0 - alpha);
        }
        dst[3] = alpha + dst[3] * (1.0 - alpha);
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }

    /// Covers every pixel whose centre lies inside the circle, and always the
    /// pixel under the centre so sub-pixel particles stay visible
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) {
        let cx = center[0] / self.scale;
        let cy = center[1] / self.scale;
        let r = radius / self.scale;

        let min_x = (cx - r).floor() as isize;
        let max_x = (cx + r).ceil() as isize;
        let min_y = (cy - r).floor() as isize;
        let max_y = (cy + r).ceil() as isize;
        let center_pixel = (cx.floor() as isize, cy.floor() as isize);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r || (x, y) == center_pixel {
                    self.blend(x, y, color, color.a);
                }
            }
        }
    }

    /// Bresenham segment; widths under one pixel fade the line instead of
    /// thinning it
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], stroke: Stroke) {
        if from == to {
            return;
        }
        let alpha = stroke.color.a * stroke.width.min(1.0);

        let (mut x0, mut y0, x1, y1) = (
            (from[0] / self.scale).floor() as isize,
            (from[1] / self.scale).floor() as isize,
            (to[0] / self.scale).floor() as isize,
            (to[1] / self.scale).floor() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend(x0, y0, stroke.color, alpha);

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}
