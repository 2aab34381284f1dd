//! Framebuffer serialization
//!
//! TGA is written by hand so the byte layout is exact: an 18-byte header,
//! then bottom-up rows of B, G, R bytes. PNG goes through the `image` crate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::rasterizer::Framebuffer;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported output format: {0:?} (expected .tga or .png)")]
    UnsupportedFormat(String),

    #[error("{width}x{height} does not fit in a TGA header")]
    TooLarge { width: usize, height: usize },
}

/// Size of the fixed TGA header
pub const TGA_HEADER_LEN: usize = 18;

const TGA_UNCOMPRESSED_TRUECOLOR: u8 = 2;

/// Clamp to [0, 1] and scale to a byte
pub fn quantize(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

/// Pixel bytes in R, G, B order
pub fn pixel_rgb(fb: &Framebuffer, x: usize, y: usize) -> [u8; 3] {
    let c = fb.color_at(x, y);
    [quantize(c.x), quantize(c.y), quantize(c.z)]
}

fn tga_header(width: usize, height: usize) -> Result<[u8; TGA_HEADER_LEN], OutputError> {
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(OutputError::TooLarge { width, height }),
    };

    let mut header = [0u8; TGA_HEADER_LEN];
    // [0] id length, [1] color map type, [3..8] color map spec: all zero
    header[2] = TGA_UNCOMPRESSED_TRUECOLOR;
    // [8..12] x/y origin: zero
    header[12..14].copy_from_slice(&w.to_le_bytes());
    header[14..16].copy_from_slice(&h.to_le_bytes());
    header[16] = 24;
    // [17] descriptor 0: bottom-left origin, no alpha bits
    Ok(header)
}

/// Write the framebuffer as an uncompressed 24-bit TGA.
pub fn write_tga<W: Write>(fb: &Framebuffer, writer: W) -> Result<(), OutputError> {
    let header = tga_header(fb.width, fb.height)?;
    let mut out = BufWriter::new(writer);
    out.write_all(&header)?;

    let mut row = Vec::with_capacity(fb.width * 3);
    // row 0 is the bottom of the image, which TGA stores first
    for y in 0..fb.height {
        row.clear();
        for x in 0..fb.width {
            let [r, g, b] = pixel_rgb(fb, x, y);
            row.extend_from_slice(&[b, g, r]);
        }
        out.write_all(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Encode as PNG; PNG stores the top row first.
fn write_png(fb: &Framebuffer, path: &Path) -> Result<(), OutputError> {
    let (w, h) = match (u32::try_from(fb.width), u32::try_from(fb.height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(OutputError::TooLarge {
                width: fb.width,
                height: fb.height,
            })
        }
    };

    let img = image::RgbImage::from_fn(w, h, |x, row| {
        let y = fb.height - 1 - row as usize;
        image::Rgb(pixel_rgb(fb, x as usize, y))
    });
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Save the framebuffer, choosing the format from the file extension.
pub fn save_image<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "tga" => write_tga(fb, File::create(path)?)?,
        "png" => write_png(fb, path)?,
        _ => return Err(OutputError::UnsupportedFormat(path.display().to_string())),
    }

    log::info!("Wrote {}x{} image to {}", fb.width, fb.height, path.display());
    Ok(())
}

/// ASCII coverage mask: top row first, `*` where any triangle was drawn.
pub fn write_coverage<W: Write>(fb: &Framebuffer, writer: W) -> Result<(), OutputError> {
    let mut out = BufWriter::new(writer);
    let mut line = String::with_capacity(fb.width + 1);
    for y in (0..fb.height).rev() {
        line.clear();
        for x in 0..fb.width {
            line.push(if fb.is_covered(x, y) { '*' } else { ' ' });
        }
        line.push('\n');
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{rasterize_triangle, Triangle, Vec3, Vertex, Viewport, WorldBounds};

    fn sample_fb() -> Framebuffer {
        // 3x2, bottom row red then green then over-bright, top row blue and black
        let mut fb = Framebuffer::new(3, 2);
        fb.set_pixel_with_depth(0, 0, 0.0, Vec3::new(1.0, 0.0, 0.0));
        fb.set_pixel_with_depth(1, 0, 0.0, Vec3::new(0.0, 1.0, 0.0));
        fb.set_pixel_with_depth(2, 0, 0.0, Vec3::new(2.0, -1.0, 0.5));
        fb.set_pixel_with_depth(0, 1, 0.0, Vec3::new(0.0, 0.0, 1.0));
        fb
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(-0.5), 0);
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 127);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(7.0), 255);
    }

    #[test]
    fn test_tga_bytes() {
        let mut bytes = Vec::new();
        write_tga(&sample_fb(), &mut bytes).unwrap();

        assert_eq!(
            &bytes[..TGA_HEADER_LEN],
            &[0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 2, 0, 24, 0]
        );
        let pixels = &bytes[TGA_HEADER_LEN..];
        assert_eq!(pixels.len(), 3 * 2 * 3);
        // bottom row first, BGR
        assert_eq!(&pixels[0..3], &[0, 0, 255]);
        assert_eq!(&pixels[3..6], &[0, 255, 0]);
        assert_eq!(&pixels[6..9], &[127, 0, 255]);
        assert_eq!(&pixels[9..12], &[255, 0, 0]);
        assert_eq!(&pixels[12..18], &[0; 6]);
    }

    #[test]
    fn test_tga_too_large() {
        let fb = Framebuffer::new(70_000, 1);
        let err = write_tga(&fb, std::io::sink()).unwrap_err();
        assert!(matches!(err, OutputError::TooLarge { width: 70_000, height: 1 }));
    }

    #[test]
    fn test_tga_decodes_with_image_crate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tga");
        save_image(&sample_fb(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (3, 2));
        // image rows run top to bottom
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(2, 1).0, [255, 0, 127]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_png_matches_tga_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&sample_fb(), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(&sample_fb(), dir.path().join("out.bmp")).unwrap_err();
        assert!(matches!(err, OutputError::UnsupportedFormat(_)));
        assert!(!dir.path().join("out.bmp").exists());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(&sample_fb(), dir.path().join("no/such/dir/out.tga")).unwrap_err();
        assert!(matches!(err, OutputError::Io(_)));
    }

    #[test]
    fn test_round_trip_triangle_through_file() {
        let mut fb = Framebuffer::new(40, 40);
        let n = Vec3::new(0.0, 0.0, 1.0);
        let color = Vec3::new(0.2, 0.4, 0.8);
        let t = Triangle::new(
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), color, n),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), color, n),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), color, n),
            n,
        )
        .projected(&Viewport::new(WorldBounds::default(), 40, 40));
        rasterize_triangle(&mut fb, &t).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.tga");
        save_image(&fb, &path).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();

        for (x, y) in [(0, 0), (39, 0), (0, 39), (39, 39)] {
            assert_eq!(img.get_pixel(x, y).0, [0, 0, 0]);
        }
        // screen centroid (20, 13.3) is image row 39 - 13
        let expected = pixel_rgb(&fb, 20, 13);
        assert_eq!(img.get_pixel(20, 26).0, expected);
        let [r, g, b] = expected;
        assert!((r as i32 - 51).abs() <= 1);
        assert!((g as i32 - 102).abs() <= 1);
        assert!((b as i32 - 204).abs() <= 1);
    }

    #[test]
    fn test_coverage_mask() {
        let mut out = Vec::new();
        write_coverage(&sample_fb(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "*  \n***\n");
    }
}
