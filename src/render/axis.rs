//! Frequency and time axis mapping
//!
//! Pure functions shared by the compositor (bin placement) and the overlay
//! painter (axis labels). The frequency mapping is bidirectional so labels
//! can be derived from pixel positions rather than from bin indices.

/// Vertical distribution of frequency bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyScale {
    Linear,
    Logarithmic,
}

impl FrequencyScale {
    pub fn toggled(self) -> Self {
        match self {
            FrequencyScale::Linear => FrequencyScale::Logarithmic,
            FrequencyScale::Logarithmic => FrequencyScale::Linear,
        }
    }
}

/// Vertical pixel position of the lower edge of a frequency bin.
///
/// Index 0 (lowest frequency) maps to the bottom of the buffer (`height`),
/// index `total_bins` to the top. Under the logarithmic scale the first bin
/// sits at `log10(1) = 0`, the mapping's minimum, so index 0 is safe there
/// too. Callers enforce `total_bins >= 2` before the logarithmic scale can
/// be selected.
pub fn bin_to_y(index: usize, total_bins: usize, height: f32, scale: FrequencyScale) -> f32 {
    match scale {
        FrequencyScale::Linear => height * (1.0 - index as f32 / total_bins as f32),
        FrequencyScale::Logarithmic => {
            let log_max = (total_bins as f32).log10();
            height * (1.0 - (index as f32 + 1.0).log10() / log_max)
        }
    }
}

/// Frequency in Hz represented at a vertical pixel position.
///
/// Inverse of [`bin_to_y`] with `max_frequency` (the Nyquist frequency)
/// taking the place of the bin count.
pub fn y_to_frequency(y: f32, height: f32, max_frequency: f32, scale: FrequencyScale) -> f32 {
    match scale {
        FrequencyScale::Linear => max_frequency * (1.0 - y / height),
        FrequencyScale::Logarithmic => {
            10.0f32.powf((1.0 - y / height) * max_frequency.log10()) - 1.0
        }
    }
}

/// One elapsed-time axis tick: horizontal position and seconds before "now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTick {
    pub x: f32,
    pub seconds: f32,
}

/// Elapsed-time ticks across the scroll area.
///
/// A column survives `width / speed` frames on screen, so the leftmost tick
/// carries the oldest visible time and the rightmost is 0 (now). Returns
/// `num_ticks + 1` entries.
pub fn time_ticks(width: f32, speed: u32, frame_rate: f32, num_ticks: usize) -> Vec<TimeTick> {
    let total_time = (width / speed as f32) / frame_rate;
    (0..=num_ticks)
        .map(|tick| TimeTick {
            x: tick as f32 * (width / num_ticks as f32),
            seconds: total_time * (1.0 - tick as f32 / num_ticks as f32),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHT: f32 = 600.0;
    const BINS: usize = 1024;

    #[test]
    fn test_bin_to_y_spans_full_height() {
        for scale in [FrequencyScale::Linear, FrequencyScale::Logarithmic] {
            assert!((bin_to_y(0, BINS, HEIGHT, scale) - HEIGHT).abs() < 1.0, "{scale:?}");
            assert!(bin_to_y(BINS, BINS, HEIGHT, scale).abs() < 1.0, "{scale:?}");
        }
    }

    #[test]
    fn test_bin_to_y_is_strictly_decreasing() {
        for scale in [FrequencyScale::Linear, FrequencyScale::Logarithmic] {
            let mut prev = bin_to_y(0, BINS, HEIGHT, scale);
            for index in 1..=BINS {
                let y = bin_to_y(index, BINS, HEIGHT, scale);
                assert!(y < prev, "{scale:?} not decreasing at index {index}");
                prev = y;
            }
        }
    }

    #[test]
    fn test_first_log_bin_does_not_blow_up() {
        let y = bin_to_y(0, BINS, HEIGHT, FrequencyScale::Logarithmic);
        assert!(y.is_finite());
        assert!((y - HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_linear_round_trip_recovers_bin_centers() {
        let max_frequency = 22_050.0;
        let bin_width = max_frequency / BINS as f32;
        for index in 0..=BINS {
            let y = bin_to_y(index, BINS, HEIGHT, FrequencyScale::Linear);
            let freq = y_to_frequency(y, HEIGHT, max_frequency, FrequencyScale::Linear);
            let expected = max_frequency * index as f32 / BINS as f32;
            assert!(
                (freq - expected).abs() <= bin_width,
                "bin {index}: got {freq}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_log_round_trip_recovers_bin_indices() {
        // With the frequency span equal to the bin count the two log
        // relations coincide, so the round trip must land back on the bin.
        let max_frequency = BINS as f32;
        for index in 0..=BINS {
            let y = bin_to_y(index, BINS, HEIGHT, FrequencyScale::Logarithmic);
            let freq = y_to_frequency(y, HEIGHT, max_frequency, FrequencyScale::Logarithmic);
            assert!(
                (freq - index as f32).abs() <= 1.0,
                "bin {index}: recovered {freq}"
            );
        }
    }

    #[test]
    fn test_log_inverse_endpoints() {
        let max_frequency = 22_050.0;
        let bottom = y_to_frequency(HEIGHT, HEIGHT, max_frequency, FrequencyScale::Logarithmic);
        let top = y_to_frequency(0.0, HEIGHT, max_frequency, FrequencyScale::Logarithmic);
        assert!(bottom.abs() < 0.01);
        assert!((top - max_frequency).abs() <= max_frequency / BINS as f32);
    }

    #[test]
    fn test_time_ticks_endpoints_and_linearity() {
        let ticks = time_ticks(800.0, 2, 60.0, 4);
        assert_eq!(ticks.len(), 5);

        let total = (800.0 / 2.0) / 60.0;
        assert!((ticks[0].seconds - total).abs() < 1e-4);
        assert!(ticks[4].seconds.abs() < 1e-4);
        assert!((ticks[0].x).abs() < 1e-4);
        assert!((ticks[4].x - 800.0).abs() < 1e-4);

        // Uniform spacing in both time and position.
        for pair in ticks.windows(2) {
            assert!((pair[0].seconds - pair[1].seconds - total / 4.0).abs() < 1e-4);
            assert!((pair[1].x - pair[0].x - 200.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_faster_scroll_shortens_visible_history() {
        let slow = time_ticks(800.0, 1, 60.0, 4);
        let fast = time_ticks(800.0, 8, 60.0, 4);
        assert!(slow[0].seconds > fast[0].seconds);
    }
}
