//! Core rendering functions
//! Bounding-box scan with barycentric membership and a depth test

use rayon::prelude::*;

use super::math::{
    barycentric_denominator, barycentric_with, degenerate_tolerance, is_degenerate, strictly_inside, Vec3,
};
use super::shading::shade_triangle;
use super::types::{RasterSettings, Triangle, Viewport, WorldBounds};

/// Depth of an untouched pixel. Larger depth is closer to the camera.
pub const FAR_DEPTH: f32 = f32::NEG_INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Zero-area triangle in screen space (e.g. seen edge-on)
    #[error("degenerate triangle: zero area in screen space")]
    DegenerateTriangle,

    #[error("{width}x{height} canvas does not fit in memory")]
    CanvasTooLarge { width: usize, height: usize },
}

/// Framebuffer for software rendering
///
/// Channels are unclamped floats; row 0 is the bottom of the image.
pub struct Framebuffer {
    pub red: Vec<f32>,
    pub green: Vec<f32>,
    pub blue: Vec<f32>,
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    /// Panics if `width * height` overflows; see `try_new`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_len(width, height, width * height)
    }

    /// Like `new`, but reports an oversized canvas instead of panicking.
    pub fn try_new(width: usize, height: usize) -> Result<Self, RenderError> {
        let n = width
            .checked_mul(height)
            .ok_or(RenderError::CanvasTooLarge { width, height })?;
        Ok(Self::with_len(width, height, n))
    }

    fn with_len(width: usize, height: usize, n: usize) -> Self {
        Self {
            red: vec![0.0; n],
            green: vec![0.0; n],
            blue: vec![0.0; n],
            depth: vec![FAR_DEPTH; n],
            width,
            height,
        }
    }

    pub fn clear(&mut self, background: Vec3) {
        self.red.fill(background.x);
        self.green.fill(background.y);
        self.blue.fill(background.z);
        self.depth.fill(FAR_DEPTH);
    }

    /// Larger side in pixels
    fn extent(&self) -> f32 {
        self.width.max(self.height) as f32
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn color_at(&self, x: usize, y: usize) -> Vec3 {
        let i = self.index(x, y);
        Vec3::new(self.red[i], self.green[i], self.blue[i])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// True once any triangle has been drawn at (x, y)
    pub fn is_covered(&self, x: usize, y: usize) -> bool {
        self.depth_at(x, y) > FAR_DEPTH
    }

    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Vec3) -> bool {
        if x < self.width && y < self.height {
            self.as_band().set_pixel_with_depth(x, y, z, color)
        } else {
            false
        }
    }

    /// The whole framebuffer as a single band
    fn as_band(&mut self) -> FramebufferBand<'_> {
        FramebufferBand {
            width: self.width,
            y_start: 0,
            rows: self.height,
            red: &mut self.red,
            green: &mut self.green,
            blue: &mut self.blue,
            depth: &mut self.depth,
        }
    }
}

/// Exclusive view over a run of whole rows of a framebuffer
struct FramebufferBand<'a> {
    width: usize,
    y_start: usize,
    rows: usize,
    red: &'a mut [f32],
    green: &'a mut [f32],
    blue: &'a mut [f32],
    depth: &'a mut [f32],
}

impl FramebufferBand<'_> {
    /// `y` is in framebuffer coordinates and must fall inside the band.
    fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Vec3) -> bool {
        let idx = (y - self.y_start) * self.width + x;
        if z > self.depth[idx] {
            self.depth[idx] = z;
            self.red[idx] = color.x;
            self.green[idx] = color.y;
            self.blue[idx] = color.z;
            return true;
        }
        false
    }
}

/// Screen-space triangle with its barycentric denominator checked
/// against the rounding noise of a canvas `canvas_extent` pixels across
struct TriangleSetup<'a> {
    triangle: &'a Triangle,
    denom: f32,
}

impl<'a> TriangleSetup<'a> {
    fn new(triangle: &'a Triangle, canvas_extent: f32) -> Result<Self, RenderError> {
        let (p1, p2, p3) = (triangle.v1.position, triangle.v2.position, triangle.v3.position);
        let denom = barycentric_denominator(p1, p2, p3);
        if is_degenerate(denom, degenerate_tolerance(p1, p2, p3, canvas_extent)) {
            return Err(RenderError::DegenerateTriangle);
        }
        Ok(Self { triangle, denom })
    }
}

/// Pixel range [start, end) covered by a float interval, clipped to [lo, hi).
/// The start is truncated toward zero and the loop runs while `i < max`.
fn pixel_span(min: f32, max: f32, lo: usize, hi: usize) -> (usize, usize) {
    let start = (min as i64).max(lo as i64);
    let end = (max.ceil() as i64).min(hi as i64);
    if end <= start {
        return (0, 0);
    }
    (start as usize, end as usize)
}

/// Scan one triangle's bounding box inside a band. Returns pixels written.
fn rasterize_into(band: &mut FramebufferBand<'_>, setup: &TriangleSetup<'_>) -> usize {
    let t = setup.triangle;
    let (p1, p2, p3) = (t.v1.position, t.v2.position, t.v3.position);
    let (c1, c2, c3) = (t.v1.color, t.v2.color, t.v3.color);

    let (x0, x1) = pixel_span(t.bounds.min_x, t.bounds.max_x, 0, band.width);
    let (y0, y1) = pixel_span(
        t.bounds.min_y,
        t.bounds.max_y,
        band.y_start,
        band.y_start + band.rows,
    );

    let mut written = 0;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Vec3::new(x as f32, y as f32, 0.0);
            let bc = barycentric_with(p, p1, p2, p3, setup.denom);

            if !strictly_inside(bc) {
                continue;
            }

            let color = c1 * bc.x + c2 * bc.y + c3 * bc.z;
            let z = bc.x * p1.z + bc.y * p2.z + bc.z * p3.z;

            if band.set_pixel_with_depth(x, y, z, color) {
                written += 1;
            }
        }
    }
    written
}

/// Rasterize a single screen-space triangle into the framebuffer.
///
/// The triangle must already be projected (bounding box assigned).
/// Returns the number of pixels that passed the depth test.
pub fn rasterize_triangle(fb: &mut Framebuffer, triangle: &Triangle) -> Result<usize, RenderError> {
    let setup = TriangleSetup::new(triangle, fb.extent())?;
    Ok(rasterize_into(&mut fb.as_band(), &setup))
}

/// Counters from one render pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize,
    pub rasterized: usize,
    pub degenerate: usize,
    pub pixels_written: usize,
}

fn setup_all(triangles: &[Triangle], canvas_extent: f32) -> (Vec<TriangleSetup<'_>>, usize) {
    let mut setups = Vec::with_capacity(triangles.len());
    let mut degenerate = 0;
    for (i, t) in triangles.iter().enumerate() {
        match TriangleSetup::new(t, canvas_extent) {
            Ok(s) => setups.push(s),
            Err(e) => {
                log::debug!("skipping triangle {}: {}", i, e);
                degenerate += 1;
            }
        }
    }
    (setups, degenerate)
}

/// Rasterize screen-space triangles in input order on the calling thread.
pub fn render_triangles(fb: &mut Framebuffer, triangles: &[Triangle]) -> RenderStats {
    let (setups, degenerate) = setup_all(triangles, fb.extent());
    let mut band = fb.as_band();
    let pixels_written = setups.iter().map(|s| rasterize_into(&mut band, s)).sum();

    RenderStats {
        triangles: triangles.len(),
        rasterized: setups.len(),
        degenerate,
        pixels_written,
    }
}

/// Same result as `render_triangles`, with one rayon task per band of rows.
///
/// Each band owns its rows outright and applies every triangle in input
/// order, so the depth test resolves exactly as in the sequential pass.
pub fn render_triangles_parallel(fb: &mut Framebuffer, triangles: &[Triangle]) -> RenderStats {
    let (setups, degenerate) = setup_all(triangles, fb.extent());
    let mut stats = RenderStats {
        triangles: triangles.len(),
        rasterized: setups.len(),
        degenerate,
        pixels_written: 0,
    };
    if fb.width == 0 || fb.height == 0 {
        return stats;
    }

    let width = fb.width;
    let rows_per_band = fb.height.div_ceil(rayon::current_num_threads()).max(1);
    let chunk = rows_per_band * width;

    stats.pixels_written = fb
        .red
        .par_chunks_mut(chunk)
        .zip(fb.green.par_chunks_mut(chunk))
        .zip(fb.blue.par_chunks_mut(chunk))
        .zip(fb.depth.par_chunks_mut(chunk))
        .enumerate()
        .map(|(i, (((red, green), blue), depth))| {
            let mut band = FramebufferBand {
                width,
                y_start: i * rows_per_band,
                rows: red.len() / width,
                red,
                green,
                blue,
                depth,
            };
            setups.iter().map(|s| rasterize_into(&mut band, s)).sum::<usize>()
        })
        .sum();

    stats
}

/// Shade, project and rasterize world-space triangles.
///
/// The viewport is the world window mapped onto the framebuffer's size.
pub fn render_scene(
    fb: &mut Framebuffer,
    triangles: &[Triangle],
    world: &WorldBounds,
    settings: &RasterSettings,
) -> RenderStats {
    let viewport = Viewport::new(*world, fb.width, fb.height);

    let screen: Vec<Triangle> = triangles
        .iter()
        .map(|t| shade_triangle(t, &settings.light, settings.shading).projected(&viewport))
        .collect();

    if settings.parallel {
        render_triangles_parallel(fb, &screen)
    } else {
        render_triangles(fb, &screen)
    }
}

/// Red/green/blue test triangle facing the camera
pub fn create_test_triangle() -> Triangle {
    use super::types::Vertex;

    let normal = Vec3::new(0.0, 0.0, 1.0);
    Triangle::new(
        Vertex::new(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), normal),
        Vertex::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 1.0, 0.0), normal),
        Vertex::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), normal),
        normal,
    )
}
