//! Video frame type

use crate::CameraError;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (milliseconds since source open)
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ms: u64,
        sequence: u32,
    ) -> Result<Self, CameraError> {
        let expected = (width as usize) * (height as usize) * 3;
        if data.len() != expected {
            return Err(CameraError::Format(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ms,
            sequence,
        })
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let result = VideoFrame::new(vec![0u8; 10], 4, 4, 0, 0);
        assert!(matches!(result, Err(CameraError::Format(_))));
    }

    #[test]
    fn pixel_access_in_and_out_of_bounds() {
        let mut data = vec![0u8; 4 * 4 * 3];
        // Pixel (1, 2) = (10, 20, 30)
        let idx = ((2 * 4 + 1) * 3) as usize;
        data[idx] = 10;
        data[idx + 1] = 20;
        data[idx + 2] = 30;

        let frame = VideoFrame::new(data, 4, 4, 0, 0).unwrap();
        assert_eq!(frame.get_pixel(1, 2), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(4, 0), None);
        assert_eq!(frame.get_pixel(0, 4), None);
    }
}
