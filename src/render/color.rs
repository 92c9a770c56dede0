//! Magnitude-to-color mapping for spectrogram pixels

use tiny_skia::ColorU8;

/// Map a byte magnitude onto the spectrogram palette.
///
/// Runs black at silence through purple and orange into yellow at full
/// scale. Each channel is clamped to [0, 255] before being scaled back down
/// by the intensity ratio, which is what fades quiet bins toward black
/// instead of saturating them.
pub fn intensity_to_color(intensity: u8) -> ColorU8 {
    let ratio = f32::from(intensity) / 255.0;

    let r = channel(255.0 * ratio) * ratio;
    let g = channel(255.0 * (ratio - 0.5) * 2.0) * ratio;
    let b = channel(255.0 * (1.0 - ratio)) * ratio;

    ColorU8::from_rgba(r.round() as u8, g.round() as u8, b.round() as u8, 255)
}

fn channel(value: f32) -> f32 {
    value.clamp(0.0, 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_intensity_is_black() {
        let color = intensity_to_color(0);
        assert_eq!((color.red(), color.green(), color.blue()), (0, 0, 0));
    }

    #[test]
    fn test_full_intensity_is_yellow() {
        let color = intensity_to_color(255);
        assert_eq!((color.red(), color.green(), color.blue()), (255, 255, 0));
    }

    #[test]
    fn test_all_intensities_are_opaque() {
        for intensity in 0..=255u8 {
            assert_eq!(intensity_to_color(intensity).alpha(), 255);
        }
    }

    #[test]
    fn test_green_stays_dark_below_midpoint() {
        // The green channel only opens up in the top half of the range,
        // which is what gives the low end its purple cast.
        for intensity in 0..128u8 {
            assert_eq!(intensity_to_color(intensity).green(), 0, "intensity {intensity}");
        }
        assert!(intensity_to_color(200).green() > 0);
    }

    #[test]
    fn test_blue_fades_out_at_the_top() {
        assert!(intensity_to_color(64).blue() > 0);
        assert_eq!(intensity_to_color(255).blue(), 0);
    }
}
