//! Scrolling pixel buffer for the spectrogram body
//!
//! The compositor is the only writer of its pixmap. Every frame it shifts
//! the whole buffer left by the scroll speed and repaints the freshly
//! exposed strip on the right edge from the latest magnitude frame, one
//! rectangle per frequency bin.

use tiny_skia::Pixmap;

use crate::render::RenderError;
use crate::render::axis::{FrequencyScale, bin_to_y};
use crate::render::color::intensity_to_color;

pub struct ScrollCompositor {
    pixmap: Pixmap,
    total_bins: usize,
}

impl ScrollCompositor {
    pub fn new(width: u32, height: u32, total_bins: usize) -> Result<Self, RenderError> {
        Ok(Self {
            pixmap: blank_pixmap(width, height)?,
            total_bins,
        })
    }

    /// Replace the buffer with a blank one at new dimensions.
    ///
    /// Scrolled history is discarded, not migrated; after a viewport change
    /// the old columns are meaningless at the new geometry anyway.
    pub fn reset(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.pixmap = blank_pixmap(width, height)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn total_bins(&self) -> usize {
        self.total_bins
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Scroll left by `speed` columns and paint that many fresh ones from
    /// `frame`.
    ///
    /// Bins are painted in ascending order with shared, rounded boundary
    /// rows, so the rectangles tile the full buffer height with no gaps and
    /// no overlaps. Each pixel row of the new strip belongs to exactly one
    /// bin.
    pub fn composite(&mut self, frame: &[u8], scale: FrequencyScale, speed: u32) {
        debug_assert_eq!(frame.len(), self.total_bins);

        let width = self.pixmap.width() as usize;
        let height = self.pixmap.height() as usize;
        let shift = (speed as usize).min(width);
        if shift == 0 || height == 0 {
            return;
        }

        let total_bins = self.total_bins;
        let height_px = height as f32;
        let stride = width * 4;
        let data = self.pixmap.data_mut();

        // Shift the surviving columns left, row by row.
        for row in 0..height {
            let start = row * stride;
            data.copy_within(start + shift * 4..start + stride, start);
        }

        // Clear the exposed strip before painting over it.
        paint_strip(data, width, shift, 0..height, intensity_to_color(0));

        for (index, &magnitude) in frame.iter().enumerate() {
            let bottom = bin_to_y(index, total_bins, height_px, scale);
            let top = bin_to_y(index + 1, total_bins, height_px, scale);

            let row_top = top.round().clamp(0.0, height_px) as usize;
            let row_bottom = bottom.round().clamp(0.0, height_px) as usize;
            if row_top >= row_bottom {
                continue;
            }

            paint_strip(data, width, shift, row_top..row_bottom, intensity_to_color(magnitude));
        }
    }
}

/// Fill the rightmost `shift` columns of the given rows with one color.
///
/// Every painted pixel is fully opaque, so the premultiplied bytes equal
/// the straight RGBA ones.
fn paint_strip(
    data: &mut [u8],
    width: usize,
    shift: usize,
    rows: std::ops::Range<usize>,
    color: tiny_skia::ColorU8,
) {
    let rgba = [color.red(), color.green(), color.blue(), color.alpha()];
    for row in rows {
        let edge = (row * width + (width - shift)) * 4;
        for pixel in data[edge..edge + shift * 4].chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }
}

fn blank_pixmap(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::BufferAlloc { width, height })?;
    pixmap.fill(tiny_skia::Color::BLACK);
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::PremultipliedColorU8;

    fn pixel(compositor: &ScrollCompositor, x: u32, y: u32) -> PremultipliedColorU8 {
        compositor.pixmap().pixel(x, y).unwrap()
    }

    fn rgb(px: PremultipliedColorU8) -> (u8, u8, u8) {
        (px.red(), px.green(), px.blue())
    }

    #[test]
    fn test_zero_frame_paints_solid_black_columns() {
        let mut compositor = ScrollCompositor::new(64, 48, 1024).unwrap();
        compositor.composite(&[0u8; 1024], FrequencyScale::Linear, 2);

        for y in 0..48 {
            for x in 62..64 {
                assert_eq!(rgb(pixel(&compositor, x, y)), (0, 0, 0), "({x},{y})");
            }
        }
    }

    #[test]
    fn test_composite_paints_exactly_speed_columns() {
        let mut compositor = ScrollCompositor::new(32, 16, 4).unwrap();
        // Full-scale everywhere: the fresh strip turns yellow, everything
        // that scrolled in from the blank buffer stays black.
        compositor.composite(&[255u8; 4], FrequencyScale::Linear, 3);

        for y in 0..16 {
            for x in 0..32u32 {
                let expected = if x >= 29 { (255, 255, 0) } else { (0, 0, 0) };
                assert_eq!(rgb(pixel(&compositor, x, y)), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_bins_tile_the_height_without_gaps_or_overlaps() {
        // One bin per pixel row: every row of the strip must carry its own
        // bin's color, bottom row = bin 0.
        let height = 8u32;
        let mut compositor = ScrollCompositor::new(8, height, height as usize).unwrap();
        let frame: Vec<u8> = (0..height as usize).map(|bin| (bin * 30) as u8).collect();
        compositor.composite(&frame, FrequencyScale::Linear, 1);

        for (bin, &magnitude) in frame.iter().enumerate() {
            let y = height - 1 - bin as u32;
            let expected = intensity_to_color(magnitude).premultiply();
            assert_eq!(pixel(&compositor, 7, y), expected, "bin {bin}");
        }
    }

    #[test]
    fn test_columns_scroll_left_unchanged() {
        let mut compositor = ScrollCompositor::new(16, 8, 8).unwrap();
        let loud = [255u8; 8];
        let silent = [0u8; 8];

        compositor.composite(&loud, FrequencyScale::Linear, 2);
        compositor.composite(&silent, FrequencyScale::Linear, 2);

        // The loud columns moved from x 14..16 to x 12..14; the new edge is
        // black.
        for y in 0..8 {
            assert_eq!(rgb(pixel(&compositor, 12, y)), (255, 255, 0));
            assert_eq!(rgb(pixel(&compositor, 13, y)), (255, 255, 0));
            assert_eq!(rgb(pixel(&compositor, 14, y)), (0, 0, 0));
            assert_eq!(rgb(pixel(&compositor, 15, y)), (0, 0, 0));
        }
    }

    #[test]
    fn test_log_scale_stretches_low_bins() {
        // Two bins under the log scale: bin 0 spans the entire height
        // because log10(2)/log10(2) = 1.
        let mut compositor = ScrollCompositor::new(8, 8, 2).unwrap();
        compositor.composite(&[255, 0], FrequencyScale::Logarithmic, 1);

        for y in 0..8 {
            assert_eq!(rgb(pixel(&compositor, 7, y)), (255, 255, 0), "row {y}");
        }
    }

    #[test]
    fn test_reset_discards_history() {
        let mut compositor = ScrollCompositor::new(16, 8, 8).unwrap();
        compositor.composite(&[255u8; 8], FrequencyScale::Linear, 4);
        compositor.reset(20, 8).unwrap();

        assert_eq!(compositor.width(), 20);
        for y in 0..8 {
            for x in 0..20 {
                assert_eq!(rgb(pixel(&compositor, x, y)), (0, 0, 0));
            }
        }
    }
}
