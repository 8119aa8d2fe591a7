use crate::models::{Sample, SampleError};

/// Twelve 8×8 glyphs with their labels.
const DEMO_PATTERNS: [(&str, [&str; 8]); 12] = [
    (
        "target_lock",
        [
            "00011000", "00011000", "00011000", "11100111", "11100111", "00011000", "00011000",
            "00011000",
        ],
    ),
    (
        "invader",
        [
            "00011000", "00111100", "01111110", "11011011", "11111111", "00100100", "01011010",
            "10100101",
        ],
    ),
    (
        "data_block",
        [
            "11111111", "10101010", "10101010", "11111111", "10101010", "10101010", "11111111",
            "00000000",
        ],
    ),
    (
        "signal",
        [
            "00000000", "00011000", "00100100", "01000010", "10000001", "00000000", "00011000",
            "00011000",
        ],
    ),
    (
        "cpu_core",
        [
            "11111111", "10000001", "10111101", "10100101", "10100101", "10111101", "10000001",
            "11111111",
        ],
    ),
    (
        "digit_0",
        [
            "00111100", "01100110", "11000011", "11000011", "11000011", "11000011", "01100110",
            "00111100",
        ],
    ),
    (
        "digit_1",
        [
            "00011000", "00111000", "01011000", "00011000", "00011000", "00011000", "00011000",
            "01111110",
        ],
    ),
    (
        "x_mark",
        [
            "11000011", "11000011", "01100110", "00111100", "00111100", "01100110", "11000011",
            "11000011",
        ],
    ),
    (
        "plus",
        [
            "00011000", "00011000", "00011000", "11111111", "11111111", "00011000", "00011000",
            "00011000",
        ],
    ),
    (
        "l_corner",
        [
            "11000000", "11000000", "11000000", "11000000", "11000000", "11111111", "11111111",
            "00000000",
        ],
    ),
    (
        "glitch",
        [
            "00000000", "01100110", "01100110", "00000000", "00011000", "11000011", "01111110",
            "00000000",
        ],
    ),
    (
        "up_arrow",
        [
            "00011000", "00111100", "01111110", "11111111", "00011000", "00011000", "00011000",
            "00011000",
        ],
    ),
];

/// The built-in demo dataset, one sample per label.
pub fn demo_samples() -> Result<Vec<Sample>, SampleError> {
    DEMO_PATTERNS
        .iter()
        .map(|(label, rows)| Sample::from_rows(*label, rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_set_has_twelve_distinct_8x8_samples() {
        let samples = demo_samples().expect("patterns are well formed");

        assert_eq!(samples.len(), 12);
        assert!(samples.iter().all(|s| s.width() == 8 && s.height() == 8));

        let labels: HashSet<&str> = samples.iter().map(Sample::label).collect();
        assert_eq!(labels.len(), 12);
        let bitmaps: HashSet<&[u8]> = samples.iter().map(Sample::pixels).collect();
        assert_eq!(bitmaps.len(), 12);
    }
}
