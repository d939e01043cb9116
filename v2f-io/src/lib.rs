#![allow(dead_code)]

//! Boundary-contract types shared by the whole workspace: the error
//! taxonomy, big-endian sample transcoding, the uniform quantizer, and the
//! compressed-stream envelope framing.

use std::error;
use std::fmt;
use std::io;
use std::result;

pub mod envelope;
pub mod quantizer;
pub mod sample;

pub use envelope::{read_envelope, write_envelope, Envelope, MAX_BLOCK_SIZE};
pub use quantizer::{Quantizer, QuantizerMode};
pub use sample::{read_samples, write_samples, ReadOutcome};

/// The error taxonomy of the codec core (spec section 7). Every crate in
/// the workspace returns this type at its public boundary so a caller never
/// has to match on a different error type per stage of the pipeline.
#[derive(Debug)]
pub enum Error {
    /// Transport read/write failed, or end-of-stream was misaligned.
    Io(io::Error),
    /// An aligned short read; not necessarily fatal to the caller.
    UnexpectedEndOfStream,
    /// Structurally invalid header/envelope, an out-of-range codeword, or a
    /// sample exceeding the dynamic range on the inverse path.
    CorruptedData(String),
    /// A public API was called with inconsistent arguments.
    InvalidParameter(String),
    /// A reserved or padding header slot was non-zero.
    NonZeroReservedOrPadding { field: &'static str },
    /// A driver that needs scratch storage could not create it.
    UnableToCreateTemporaryFile(io::Error),
    /// An allocation failed.
    OutOfMemory,
    /// The requested feature is not implemented by this core (e.g.
    /// `forest_id != 0`).
    FeatureNotImplemented(String),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::UnableToCreateTemporaryFile(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::UnexpectedEndOfStream => write!(f, "unexpected end of stream"),
            Self::CorruptedData(msg) => write!(f, "corrupted data: {}", msg),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            Self::NonZeroReservedOrPadding { field } => {
                write!(f, "reserved field {:?} is non-zero", field)
            }
            Self::UnableToCreateTemporaryFile(err) => {
                write!(f, "unable to create temporary file: {}", err)
            }
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::FeatureNotImplemented(feature) => {
                write!(f, "feature not implemented: {}", feature)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEndOfStream
        } else {
            Error::Io(err)
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience constructor for a corrupted-data error.
pub fn corrupted_data<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::CorruptedData(msg.into()))
}

/// Convenience constructor for an invalid-parameter error.
pub fn invalid_parameter<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::InvalidParameter(msg.into()))
}

/// Convenience constructor for a feature-not-implemented error.
pub fn feature_not_implemented<T>(feature: impl Into<String>) -> Result<T> {
    Err(Error::FeatureNotImplemented(feature.into()))
}
