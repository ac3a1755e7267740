//! A library for decoding ICO image files.
//!
//! Each image in an ICO file is stored either as an embedded PNG stream or as
//! a headerless BMP: a color (XOR) bitmap followed by a one-bit transparency
//! (AND) mask, or a 32-bit bitmap whose alpha channel supersedes the mask.
//! [`decode`] reads the whole file in one forward pass and returns every
//! image as RGBA pixels, in directory order.

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bmpdepth;
mod counting;
mod decoder;
mod error;
mod header;
mod icondir;
mod image;
mod mask;
mod raster;

pub use crate::decoder::{
    decode, decode_file, decode_images, decode_images_file, read_directory,
};
pub use crate::error::DecodeError;
pub use crate::header::{Compression, RasterHeader};
pub use crate::icondir::{IconDir, IconDirEntry, ResourceType};
pub use crate::image::{BmpImage, DecodedIcon, IconImage};
pub use crate::raster::ColorEntry;
