//! Axis overlays drawn around the scroll area
//!
//! The left margin carries frequency labels, the bottom margin elapsed-time
//! labels. Both are cleared and redrawn every tick so they always reflect
//! the current scale mode, scroll speed, and viewport. Text uses a small
//! 5x7 bitmap font; at label sizes a shaping stack would be overkill.

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use crate::render::NOMINAL_FRAME_RATE;
use crate::render::axis::{FrequencyScale, time_ticks, y_to_frequency};

/// Width of the frequency-label margin on the left edge.
pub const FREQ_AXIS_WIDTH: u32 = 48;
/// Height of the time-label margin along the bottom edge.
pub const TIME_AXIS_HEIGHT: u32 = 18;

const FREQ_TICKS: usize = 6;
const TIME_TICKS: usize = 5;

const GLYPH_ROWS: usize = 7;
const GLYPH_ADVANCE: f32 = 6.0;

fn margin_color() -> Color {
    Color::from_rgba8(30, 30, 30, 255)
}

fn label_color() -> Color {
    Color::from_rgba8(200, 200, 200, 255)
}

fn tick_color() -> Color {
    Color::from_rgba8(122, 122, 122, 255)
}

/// Redraw the frequency axis in the left margin.
///
/// Labels are derived from pixel positions through [`y_to_frequency`], so
/// they follow whatever scale the scroll area is currently painted with.
pub fn draw_frequency_axis(canvas: &mut Pixmap, scale: FrequencyScale, nyquist: f32) {
    let full_height = canvas.height() as f32;
    let area_height = full_height - TIME_AXIS_HEIGHT as f32;

    fill_rect(canvas, 0.0, 0.0, FREQ_AXIS_WIDTH as f32, full_height, margin_color());

    for tick in 0..=FREQ_TICKS {
        let y = area_height * tick as f32 / FREQ_TICKS as f32;
        let freq = y_to_frequency(y, area_height, nyquist, scale);

        fill_rect(canvas, FREQ_AXIS_WIDTH as f32 - 4.0, y.min(area_height - 1.0), 4.0, 1.0, tick_color());

        let label = format_frequency(freq);
        let label_y = (y - GLYPH_ROWS as f32 / 2.0).clamp(1.0, area_height - GLYPH_ROWS as f32 - 1.0);
        draw_text(canvas, &label, 2.0, label_y, label_color());
    }
}

/// Redraw the elapsed-time axis in the bottom margin.
pub fn draw_time_axis(canvas: &mut Pixmap, speed: u32) {
    let full_width = canvas.width() as f32;
    let area_width = full_width - FREQ_AXIS_WIDTH as f32;
    let top = canvas.height() as f32 - TIME_AXIS_HEIGHT as f32;

    fill_rect(canvas, 0.0, top, full_width, TIME_AXIS_HEIGHT as f32, margin_color());

    for tick in time_ticks(area_width, speed, NOMINAL_FRAME_RATE, TIME_TICKS) {
        let x = (FREQ_AXIS_WIDTH as f32 + tick.x).min(full_width - 1.0);
        fill_rect(canvas, x, top, 1.0, 4.0, tick_color());

        let label = format_seconds(tick.seconds);
        let label_width = label.len() as f32 * GLYPH_ADVANCE;
        let label_x = (x - label_width / 2.0).clamp(FREQ_AXIS_WIDTH as f32, full_width - label_width);
        draw_text(canvas, &label, label_x, top + 6.0, label_color());
    }
}

fn format_frequency(hz: f32) -> String {
    if hz >= 1000.0 {
        format!("{:.1}k", hz / 1000.0)
    } else {
        format!("{:.0}Hz", hz.max(0.0))
    }
}

fn format_seconds(seconds: f32) -> String {
    format!("{:.1}s", seconds)
}

fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, width: f32, height: f32, color: Color) {
    let Some(rect) = Rect::from_xywh(x, y, width, height) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    let path = PathBuilder::from_rect(rect);
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

/// Draw a label with the 5x7 bitmap font, one filled rect per lit pixel.
fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, y: f32, color: Color) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    for (i, ch) in text.chars().enumerate() {
        draw_char(pixmap, ch, x + i as f32 * GLYPH_ADVANCE, y, &paint);
    }
}

fn draw_char(pixmap: &mut Pixmap, ch: char, x: f32, y: f32, paint: &Paint) {
    let pattern: [u8; GLYPH_ROWS] = match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        's' => [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        'z' => [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        _ => [0; GLYPH_ROWS],
    };

    for (row, &bits) in pattern.iter().enumerate() {
        for col in 0..5 {
            if (bits >> (4 - col)) & 1 == 1 {
                let Some(rect) = Rect::from_xywh(x + col as f32, y + row as f32, 1.0, 1.0) else {
                    continue;
                };
                let path = PathBuilder::from_rect(rect);
                pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_labels_shorten_kilohertz() {
        assert_eq!(format_frequency(1500.0), "1.5k");
        assert_eq!(format_frequency(1000.0), "1.0k");
        assert_eq!(format_frequency(440.0), "440Hz");
        assert_eq!(format_frequency(0.0), "0Hz");
    }

    #[test]
    fn test_seconds_labels_keep_one_decimal() {
        assert_eq!(format_seconds(6.6667), "6.7s");
        assert_eq!(format_seconds(0.0), "0.0s");
    }

    #[test]
    fn test_axes_paint_their_margins() {
        let mut canvas = Pixmap::new(200, 100).unwrap();
        draw_frequency_axis(&mut canvas, FrequencyScale::Linear, 22_050.0);
        draw_time_axis(&mut canvas, 2);

        // Margin background where no label lands.
        let corner = canvas.pixel(FREQ_AXIS_WIDTH / 2, 99).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (30, 30, 30));

        // The scroll area is untouched (still the transparent fresh pixmap).
        let body = canvas.pixel(120, 40).unwrap();
        assert_eq!(body.alpha(), 0);
    }
}
