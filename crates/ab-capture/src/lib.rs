use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod geometry;

pub use geometry::{Point, Rect};

/// Width of the only frame size the vision calibration supports.
pub const FRAME_WIDTH: u32 = 840;
/// Height of the only frame size the vision calibration supports.
pub const FRAME_HEIGHT: u32 = 480;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("expecting 840x480 screenshot, got {width}x{height}")]
    UnsupportedResolution { width: u32, height: u32 },
}

/// Well-known fixed screen areas of the 840x480 game frame
pub mod regions {
    use super::Rect;

    /// Pause/restart buttons and score text in the top-left corner.
    /// Trajectory markers inside it are discarded.
    pub const fn menu() -> Rect {
        Rect::new(0, 0, 205, 60)
    }

    /// Regions fully inside this corner are HUD, never scene objects.
    pub const fn hud() -> Rect {
        Rect::new(0, 0, 190, 55)
    }

    /// The whole frame.
    pub const fn frame() -> Rect {
        Rect::new(0, 0, super::FRAME_WIDTH as i32, super::FRAME_HEIGHT as i32)
    }
}

/// A game screenshot that has passed the frame size check.
#[derive(Debug, Clone)]
pub struct Screenshot {
    image: RgbaImage,
}

impl Screenshot {
    /// Wrap a captured frame. Any size other than 840x480 is rejected.
    pub fn from_image(image: RgbaImage) -> std::result::Result<Self, CaptureError> {
        let (width, height) = image.dimensions();
        if width != FRAME_WIDTH || height != FRAME_HEIGHT {
            return Err(CaptureError::UnsupportedResolution { width, height });
        }
        Ok(Self { image })
    }

    /// Load a saved screenshot from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .to_rgba8();
        debug!(
            "Loaded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        let shot = Self::from_image(image)
            .with_context(|| format!("Unsupported screenshot {}", path.display()))?;
        Ok(shot)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed `0xRRGGBB` value of a pixel. Alpha is ignored.
    pub fn rgb(&self, x: u32, y: u32) -> u32 {
        let px = self.image.get_pixel(x, y);
        ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Crop a region out of a frame, clamped to the frame bounds
pub fn crop_region(frame: &RgbaImage, region: &Rect) -> RgbaImage {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let r = region.crop(w, h);
    image::imageops::crop_imm(
        frame,
        r.x as u32,
        r.y as u32,
        r.width as u32,
        r.height as u32,
    )
    .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_other_resolutions() {
        let img = RgbaImage::new(1920, 1080);
        match Screenshot::from_image(img) {
            Err(CaptureError::UnsupportedResolution { width, height }) => {
                assert_eq!((width, height), (1920, 1080));
            }
            Ok(_) => panic!("1920x1080 must be rejected"),
        }

        // Matching only one dimension is still wrong
        assert!(Screenshot::from_image(RgbaImage::new(840, 479)).is_err());
    }

    #[test]
    fn test_rgb_packing() {
        let mut img = RgbaImage::new(FRAME_WIDTH, FRAME_HEIGHT);
        img.put_pixel(3, 4, image::Rgba([0x12, 0x34, 0x56, 0x00]));
        let shot = Screenshot::from_image(img).unwrap();
        assert_eq!(shot.rgb(3, 4), 0x123456);
        assert_eq!(shot.rgb(0, 0), 0);
    }

    #[test]
    fn test_crop_region() {
        let img = RgbaImage::new(840, 480);
        let cropped = crop_region(&img, &Rect::new(800, 470, 100, 30));
        assert_eq!(cropped.width(), 40);
        assert_eq!(cropped.height(), 10);
    }

    #[test]
    fn test_fixed_regions_inside_frame() {
        let frame = regions::frame();
        assert!(frame.contains_rect(&regions::menu()));
        assert!(frame.contains_rect(&regions::hud()));
    }
}
