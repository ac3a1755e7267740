use std::io;
use thiserror::Error;

//===========================================================================//

/// An error encountered while decoding an ICO file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream position at the start of an image did not match the file
    /// offset declared for it in the directory.
    #[error(
        "image #{index} starts at unexpected file offset \
         (was {actual}, but directory says {expected})"
    )]
    OffsetMismatch {
        /// The directory slot of the image.
        index: usize,
        /// The offset declared in the directory entry.
        expected: u32,
        /// The actual stream position.
        actual: u64,
    },
    /// The image data began with neither a BMP header nor a PNG signature.
    #[error(
        "unrecognized icon format for image #{index} (header {word:#010x})"
    )]
    UnrecognizedFormat {
        /// The directory slot of the image.
        index: usize,
        /// The first four bytes of the image data, little-endian.
        word: u32,
    },
    /// The first half of the PNG signature matched but the second half did
    /// not.
    #[error("malformed PNG signature for image #{index}")]
    MalformedPngSignature {
        /// The directory slot of the image.
        index: usize,
    },
    /// The stream ended before an image that is not the last one in the
    /// directory was fully consumed.
    #[error("unexpected end of input in image #{index}")]
    TruncatedStream {
        /// The directory slot of the image.
        index: usize,
    },
    /// Malformed BMP header or pixel data.
    #[error("{0}")]
    InvalidData(String),
    /// Well-formed BMP data that this library can't decode.
    #[error("unsupported BMP data: {0}")]
    Unsupported(String),
    /// An error from the underlying reader.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error from the PNG decoder.
    #[error("malformed PNG data: {0}")]
    Png(#[from] png::DecodingError),
    /// Any of the above, tagged with the directory slot that failed.
    #[error("failed to read image #{index}, caused by {source}")]
    Image {
        /// The directory slot of the image.
        index: usize,
        /// The original error.
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub(crate) fn in_image(self, index: usize) -> DecodeError {
        DecodeError::Image { index, source: Box::new(self) }
    }

    /// Returns the directory slot of the image that failed to decode, if the
    /// error was raised while decoding a particular image.
    pub fn image_index(&self) -> Option<usize> {
        match *self {
            DecodeError::Image { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Returns the underlying error, looking through any `Image` wrappers.
    pub fn root_cause(&self) -> &DecodeError {
        let mut error = self;
        while let DecodeError::Image { ref source, .. } = *error {
            error = &**source;
        }
        error
    }
}

//===========================================================================//


//===========================================================================//
