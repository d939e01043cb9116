//! The file codec: header parsing plus the compress/decompress driver loop
//! (spec 4.9, 6.1).

pub mod driver;
pub mod header;

pub use driver::{Codec, CodecOverrides};
pub use header::Header;
