//! In-memory bitmap type shared by all pipeline stages

/// Dense interleaved RGB image with 8-bit samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Number of channels (3 for RGB)
    pub channels: u8,

    /// Interleaved sample data, `width * height * channels` bytes
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Create an RGB bitmap from interleaved sample data
    ///
    /// Fails with a descriptive message when the dimensions are degenerate
    /// or the buffer length does not match them.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, String> {
        let bitmap = Self {
            width,
            height,
            channels: 3,
            data,
        };
        bitmap.validate_shape()?;
        Ok(bitmap)
    }

    /// Create an RGB bitmap filled with a single color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err(format!(
                "Bitmap dimensions must be positive, got {}x{}",
                width, height
            ));
        }
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for _ in 0..count {
            data.extend_from_slice(&rgb);
        }
        Self::from_rgb(width, height, data)
    }

    /// Number of pixels in the bitmap
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the bitmap has a well-formed RGB shape
    pub(crate) fn validate_shape(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Bitmap dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }

        if self.channels != 3 {
            return Err(format!(
                "Pipeline requires 3-channel RGB, got {} channels",
                self.channels
            ));
        }

        let expected = self.pixel_count() * self.channels as usize;
        if self.data.len() != expected {
            return Err(format!(
                "Data length {} does not match {}x{}x{} ({} expected)",
                self.data.len(),
                self.width,
                self.height,
                self.channels,
                expected
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_valid() {
        let bitmap = Bitmap::from_rgb(2, 2, vec![0u8; 12]).unwrap();
        assert_eq!(bitmap.pixel_count(), 4);
        assert_eq!(bitmap.channels, 3);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = Bitmap::from_rgb(0, 4, vec![]).unwrap_err();
        assert!(err.contains("positive"), "unexpected error: {}", err);

        let err = Bitmap::from_rgb(4, 0, vec![]).unwrap_err();
        assert!(err.contains("positive"), "unexpected error: {}", err);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Bitmap::from_rgb(2, 2, vec![0u8; 11]).unwrap_err();
        assert!(err.contains("Data length"), "unexpected error: {}", err);
    }

    #[test]
    fn test_wrong_channel_count_rejected() {
        let bitmap = Bitmap {
            width: 2,
            height: 2,
            channels: 4,
            data: vec![0u8; 16],
        };
        let err = bitmap.validate_shape().unwrap_err();
        assert!(err.contains("3-channel"), "unexpected error: {}", err);
    }

    #[test]
    fn test_filled() {
        let bitmap = Bitmap::filled(3, 2, [10, 20, 30]).unwrap();
        assert_eq!(bitmap.data.len(), 18);
        assert_eq!(&bitmap.data[0..3], &[10, 20, 30]);
        assert_eq!(&bitmap.data[15..18], &[10, 20, 30]);
    }
}
