//! Fixed-size RGBA raster mirroring the server canvas.
//!
//! [`SurfaceBuffer`] is the only place pixels live on the client. Its size is
//! fixed at session start; full images of a different size are scaled to fit
//! and patches outside the bounds are rejected without touching the buffer.

use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use pixelframe_api::PixelUpdate;

use super::color::{self, Rgb};
use crate::error::{Result, ViewerError};

/// Summary of one [`SurfaceBuffer::apply_patches`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Patches written to the buffer.
    pub applied: usize,
    /// Patches skipped (bad color or out of bounds).
    pub skipped: usize,
}

/// An addressable width × height × RGBA pixel buffer.
#[derive(Debug, Clone)]
pub struct SurfaceBuffer {
    image: RgbaImage,
    /// Bumped on every mutation.
    generation: u64,
}

impl SurfaceBuffer {
    /// Create an opaque black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(Rgb::BLACK.to_rgba())),
            generation: 0,
        }
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Mutation counter; changes whenever pixels may have changed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw RGBA bytes in row-major order.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x < self.width() && y < self.height() {
            Ok(())
        } else {
            Err(self.out_of_bounds(x, y))
        }
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> ViewerError {
        ViewerError::OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        }
    }

    /// RGBA bytes of one pixel.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::OutOfBounds`] if `(x, y)` is outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        self.check_bounds(x, y)?;
        Ok(self.image.get_pixel(x, y).0)
    }

    /// Replace the whole raster with a decoded image blob.
    ///
    /// PNG, JPEG and WebP are accepted. Images of a different size are
    /// scaled to the surface, like drawing into fixed canvas bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Image`] if the blob cannot be decoded. The
    /// surface is left unchanged in that case.
    pub fn apply_full(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ViewerError::Image(format!("decode full image: {e}")))?
            .to_rgba8();

        let (width, height) = (self.width(), self.height());
        self.image = if decoded.dimensions() == (width, height) {
            decoded
        } else {
            tracing::debug!(
                from = ?decoded.dimensions(),
                to = ?(width, height),
                "scaling full image to surface"
            );
            imageops::resize(&decoded, width, height, FilterType::Nearest)
        };
        self.generation += 1;
        Ok(())
    }

    /// Paint every pixel with `rgb`.
    pub fn fill(&mut self, rgb: Rgb) {
        let px = Rgba(rgb.to_rgba());
        for p in self.image.pixels_mut() {
            *p = px;
        }
        self.generation += 1;
    }

    /// Write one update with alpha forced opaque.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Color`] for a malformed color or
    /// [`ViewerError::OutOfBounds`] for coordinates outside the surface.
    /// The buffer is untouched on error.
    pub fn apply_patch(&mut self, update: &PixelUpdate) -> Result<()> {
        let rgb = color::decode(&update.color)?;
        self.check_bounds(update.x, update.y)?;
        self.image.put_pixel(update.x, update.y, Rgba(rgb.to_rgba()));
        self.generation += 1;
        Ok(())
    }

    /// Apply updates in list order; a bad update is logged and skipped.
    pub fn apply_patches(&mut self, updates: &[PixelUpdate]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for update in updates {
            match self.apply_patch(update) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    tracing::warn!(x = update.x, y = update.y, "skipping pixel update: {e}");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    fn check_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let fits = |start: u32, len: u32, max: u32| {
            start.checked_add(len).is_some_and(|end| end <= max)
        };
        if fits(x, width, self.width()) && fits(y, height, self.height()) {
            Ok(())
        } else {
            Err(self.out_of_bounds(x.saturating_add(width), y.saturating_add(height)))
        }
    }

    /// Copy out a rectangular region as row-major RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::OutOfBounds`] unless the region lies fully inside.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Vec<u8>> {
        self.check_region(x, y, width, height)?;
        let mut out = Vec::with_capacity(width as usize * height as usize * 4);
        for row in y..y + height {
            for col in x..x + width {
                out.extend_from_slice(&self.image.get_pixel(col, row).0);
            }
        }
        Ok(out)
    }

    /// Write a rectangular region from row-major RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::OutOfBounds`] unless the region lies fully inside,
    /// or [`ViewerError::Image`] if `rgba` has the wrong length.
    pub fn put_region(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()> {
        self.check_region(x, y, width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ViewerError::Image(format!(
                "region buffer is {} bytes, expected {expected}",
                rgba.len()
            )));
        }
        for (i, chunk) in rgba.chunks_exact(4).enumerate() {
            let col = x + (i as u32 % width);
            let row = y + (i as u32 / width);
            self.image
                .put_pixel(col, row, Rgba([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        self.generation += 1;
        Ok(())
    }

    /// Encode the raster as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Image`] if encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ViewerError::Image(format!("encode png: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Write the raster to `path` as PNG, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_png()?)?;
        Ok(())
    }
}
