//! PNG payload validation for logo and preview endpoints

use crate::error::{payload_preview, ApiError};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Image bytes checked to be a PNG with a readable header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PngImage {
    /// Signature, then the IHDR chunk which must come first
    pub fn decode(data: Vec<u8>) -> Result<Self, ApiError> {
        if data.len() < 24 || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
            return Err(ApiError::UnexpectedResponseObject(payload_preview(&data)));
        }

        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        if width == 0 || height == 0 {
            return Err(ApiError::UnexpectedResponseObject(payload_preview(&data)));
        }

        Ok(Self { width, height, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    // bit depth, color type, compression, filter, interlace, crc
    data.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    data
}
