//! Base64 raster payloads to binary objects.
//!
//! The frame endpoint ships PNG bytes as one base64 string. The bytes are
//! decoded in a single pass and then split into fixed-size parts, so the host
//! can assemble a `Blob` without one large intermediate copy.

use base64::Engine as _;

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const PNG_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    Base64(String),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Base64(msg) => write!(f, "raster is not valid base64: {msg}"),
        }
    }
}

impl std::error::Error for RasterError {}

/// Binary object with a declared content type, stored as ordered parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBlob {
    content_type: String,
    chunks: Vec<Vec<u8>>,
}

impl RasterBlob {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn chunks(&self) -> &[Vec<u8>] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for c in &self.chunks {
            out.extend_from_slice(c);
        }
        out
    }
}

/// Decode `data` and split it into parts of at most `chunk_size` bytes.
///
/// A `chunk_size` of zero falls back to [`DEFAULT_CHUNK_SIZE`].
pub fn decode_chunked(
    data: &str,
    content_type: &str,
    chunk_size: usize,
) -> Result<RasterBlob, RasterError> {
    let chunk_size = if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| RasterError::Base64(e.to_string()))?;

    let chunks = bytes.chunks(chunk_size).map(<[u8]>::to_vec).collect();
    Ok(RasterBlob {
        content_type: content_type.to_string(),
        chunks,
    })
}
