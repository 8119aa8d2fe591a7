use serde::Serialize;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum SampleError {
    #[error("EmptyLabel: a sample needs a non-empty label")]
    EmptyLabel,
    #[error("NonBinaryPixel: pixel {index} is {value}, expected 0 or 1")]
    NonBinaryPixel { index: usize, value: u8 },
    #[error("DimensionMismatch: {width}x{height} does not match {length} pixels")]
    DimensionMismatch {
        width: usize,
        height: usize,
        length: usize,
    },
    #[error("RaggedRows: row {row} has {length} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        length: usize,
        expected: usize,
    },
    #[error("InvalidCharacter: '{character}' at row {row}, column {column}")]
    InvalidCharacter {
        row: usize,
        column: usize,
        character: char,
    },
}

/// A labelled binary bitmap, flattened row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    label: String,
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl Sample {
    pub fn new(
        label: impl Into<String>,
        pixels: Vec<u8>,
        width: usize,
        height: usize,
    ) -> Result<Self, SampleError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(SampleError::EmptyLabel);
        }
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(SampleError::DimensionMismatch {
                width,
                height,
                length: pixels.len(),
            });
        }
        if let Some((index, &value)) = pixels.iter().enumerate().find(|(_, value)| **value > 1) {
            return Err(SampleError::NonBinaryPixel { index, value });
        }

        Ok(Self {
            label,
            pixels,
            width,
            height,
        })
    }

    /// Builds a sample from rows of `'0'`/`'1'` characters of equal width.
    ///
    /// ```rust
    /// use evolab::models::Sample;
    ///
    /// let sample = Sample::from_rows("corner", &["10", "11"])?;
    /// assert_eq!(sample.pixels(), &[1, 0, 1, 1]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_rows(label: impl Into<String>, rows: &[&str]) -> Result<Self, SampleError> {
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut pixels = Vec::with_capacity(width * rows.len());

        for (row, line) in rows.iter().enumerate() {
            let length = line.chars().count();
            if length != width {
                return Err(SampleError::RaggedRows {
                    row,
                    length,
                    expected: width,
                });
            }
            for (column, character) in line.chars().enumerate() {
                let pixel = match character {
                    '0' => 0,
                    '1' => 1,
                    _ => {
                        return Err(SampleError::InvalidCharacter {
                            row,
                            column,
                            character,
                        });
                    }
                };
                pixels.push(pixel);
            }
        }

        Self::new(label, pixels, width, rows.len())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_validates_samples() {
        assert!(Sample::new("a", vec![0, 1, 1, 0], 2, 2).is_ok());

        assert_eq!(
            Sample::new("  ", vec![0, 1], 2, 1).unwrap_err(),
            SampleError::EmptyLabel
        );
        assert_eq!(
            Sample::new("a", vec![0, 1, 1], 2, 2).unwrap_err(),
            SampleError::DimensionMismatch {
                width: 2,
                height: 2,
                length: 3
            }
        );
        assert_eq!(
            Sample::new("a", vec![0, 2, 1, 0], 2, 2).unwrap_err(),
            SampleError::NonBinaryPixel { index: 1, value: 2 }
        );
    }

    #[test]
    fn it_rejects_overflowing_dimensions() {
        assert_eq!(
            Sample::new("a", vec![0, 1], usize::MAX, 2).unwrap_err(),
            SampleError::DimensionMismatch {
                width: usize::MAX,
                height: 2,
                length: 2
            }
        );
    }

    #[test]
    fn it_builds_samples_from_rows() {
        let sample = Sample::from_rows("tee", &["111", "010"]).expect("is valid");

        assert_eq!(sample.label(), "tee");
        assert_eq!(sample.width(), 3);
        assert_eq!(sample.height(), 2);
        assert_eq!(sample.pixels(), &[1, 1, 1, 0, 1, 0]);
    }

    #[test]
    fn it_rejects_malformed_rows() {
        assert_eq!(
            Sample::from_rows("x", &["10", "1"]).unwrap_err(),
            SampleError::RaggedRows {
                row: 1,
                length: 1,
                expected: 2
            }
        );
        assert_eq!(
            Sample::from_rows("x", &["10", "1#"]).unwrap_err(),
            SampleError::InvalidCharacter {
                row: 1,
                column: 1,
                character: '#'
            }
        );
    }
}
