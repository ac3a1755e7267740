use crate::bmpdepth::BmpDepth;
use crate::error::DecodeError;
use byteorder::{LittleEndian, ReadBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
pub(crate) const BMP_HEADER_LEN: u32 = 40;

//===========================================================================//

/// The compression method declared in a BMP header.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Compression {
    /// Uncompressed pixel data (`BI_RGB`).
    Rgb,
    /// 8-bit run-length encoding (`BI_RLE8`).
    Rle8,
    /// 4-bit run-length encoding (`BI_RLE4`).
    Rle4,
    /// Uncompressed with explicit channel masks (`BI_BITFIELDS`).
    Bitfields,
    /// Embedded JPEG data (`BI_JPEG`).
    Jpeg,
    /// Embedded PNG data (`BI_PNG`).
    Png,
    /// Uncompressed with explicit channel masks, including alpha
    /// (`BI_ALPHABITFIELDS`).
    AlphaBitfields,
}

impl Compression {
    pub(crate) fn from_number(number: u32) -> Option<Compression> {
        match number {
            0 => Some(Compression::Rgb),
            1 => Some(Compression::Rle8),
            2 => Some(Compression::Rle4),
            3 => Some(Compression::Bitfields),
            4 => Some(Compression::Jpeg),
            5 => Some(Compression::Png),
            6 => Some(Compression::AlphaBitfields),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn number(&self) -> u32 {
        match *self {
            Compression::Rgb => 0,
            Compression::Rle8 => 1,
            Compression::Rle4 => 2,
            Compression::Bitfields => 3,
            Compression::Jpeg => 4,
            Compression::Png => 5,
            Compression::AlphaBitfields => 6,
        }
    }
}

//===========================================================================//

/// The BITMAPINFOHEADER of a BMP-encoded image.
///
/// Within an ICO file, `height` counts the rows of both the color (XOR)
/// bitmap and the transparency (AND) mask, so it is twice the height of the
/// icon itself.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct RasterHeader {
    pub(crate) size: u32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) planes: u16,
    pub(crate) bits_per_pixel: u16,
    pub(crate) compression: Compression,
    pub(crate) image_size: u32,
    pub(crate) horz_ppm: i32,
    pub(crate) vert_ppm: i32,
    pub(crate) colors_used: u32,
    pub(crate) colors_important: u32,
}

impl RasterHeader {
    /// Reads the rest of a BMP header whose leading size field (`size`) has
    /// already been consumed.  Headers longer than a BITMAPINFOHEADER have
    /// their extra fields skipped.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
        size: u32,
    ) -> Result<RasterHeader, DecodeError> {
        if size < BMP_HEADER_LEN {
            invalid_data!(
                "Invalid BMP header size (was {}, but must be at least {})",
                size,
                BMP_HEADER_LEN
            );
        }
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;
        let planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let compression = match Compression::from_number(compression) {
            Some(compression) => compression,
            None => invalid_data!("Invalid BMP compression ({})", compression),
        };
        let image_size = reader.read_u32::<LittleEndian>()?;
        let horz_ppm = reader.read_i32::<LittleEndian>()?;
        let vert_ppm = reader.read_i32::<LittleEndian>()?;
        let colors_used = reader.read_u32::<LittleEndian>()?;
        let colors_important = reader.read_u32::<LittleEndian>()?;
        let extra = (size - BMP_HEADER_LEN) as u64;
        if extra > 0 {
            let skipped =
                io::copy(&mut reader.by_ref().take(extra), &mut io::sink())?;
            if skipped < extra {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof)
                    .into());
            }
        }
        Ok(RasterHeader {
            size,
            width,
            height,
            planes,
            bits_per_pixel,
            compression,
            image_size,
            horz_ppm,
            vert_ppm,
            colors_used,
            colors_important,
        })
    }

    /// Returns the header for the color (XOR) bitmap of an icon: the same
    /// as this header, but with half the height.
    pub(crate) fn xor_header(&self) -> RasterHeader {
        RasterHeader { height: self.height / 2, ..self.clone() }
    }

    /// Returns the header for the transparency (AND) mask of an icon: half
    /// the height, one uncompressed bit per pixel, two colors.
    pub(crate) fn and_header(&self) -> RasterHeader {
        RasterHeader {
            height: self.height / 2,
            bits_per_pixel: 1,
            colors_used: 2,
            compression: Compression::Rgb,
            ..self.clone()
        }
    }

    /// Returns the declared size of the header structure, in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the declared width, in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the declared height, in pixels.  A negative height indicates
    /// that rows are stored top to bottom.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the number of color planes.
    pub fn planes(&self) -> u16 {
        self.planes
    }

    /// Returns the bits-per-pixel (color depth).
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the compression method.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the declared size of the pixel data, which may be zero for
    /// uncompressed images.
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// Returns the horizontal and vertical resolution, in pixels per meter.
    pub fn resolution(&self) -> (i32, i32) {
        (self.horz_ppm, self.vert_ppm)
    }

    /// Returns the number of color table entries actually used, or zero if
    /// the full table for the bit depth is used.
    pub fn colors_used(&self) -> u32 {
        self.colors_used
    }

    /// Returns the number of colors required to display the image, or zero
    /// if all are required.
    pub fn colors_important(&self) -> u32 {
        self.colors_important
    }

    /// Returns the number of entries in the color table that follows the
    /// header in the stream.
    pub(crate) fn color_table_len(&self, depth: BmpDepth) -> usize {
        let max_colors = depth.max_colors();
        let used = self.colors_used as usize;
        if used == 0 || used > max_colors {
            max_colors
        } else {
            used
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Compression, RasterHeader, BMP_HEADER_LEN};
    use crate::bmpdepth::BmpDepth;
    use crate::error::DecodeError;

    const HEADER_4BPP: &[u8] = b"\
        \x05\x00\x00\x00\x06\x00\x00\x00\
        \x01\x00\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
        \x00\x00\x00\x00";

    #[test]
    fn compression_round_trip() {
        for number in 0..7 {
            let compression = Compression::from_number(number).unwrap();
            assert_eq!(compression.number(), number);
        }
        assert_eq!(Compression::from_number(7), None);
    }

    #[test]
    fn read_info_header() {
        let header =
            RasterHeader::read(&mut &HEADER_4BPP[..], BMP_HEADER_LEN).unwrap();
        assert_eq!(header.size(), 40);
        assert_eq!(header.width(), 5);
        assert_eq!(header.height(), 6);
        assert_eq!(header.planes(), 1);
        assert_eq!(header.bits_per_pixel(), 4);
        assert_eq!(header.compression(), Compression::Rgb);
        assert_eq!(header.color_table_len(BmpDepth::Four), 16);
    }

    #[test]
    fn read_longer_header_skips_extension() {
        let mut input = HEADER_4BPP.to_vec();
        input.extend_from_slice(&[0xaa; 84]);
        input.push(0x77);
        let mut reader = input.as_slice();
        let header = RasterHeader::read(&mut reader, 124).unwrap();
        assert_eq!(header.size(), 124);
        assert_eq!(header.width(), 5);
        assert_eq!(reader, &[0x77]);
    }

    #[test]
    fn reject_short_header_size() {
        let result = RasterHeader::read(&mut &HEADER_4BPP[..], 12);
        assert!(matches!(result, Err(DecodeError::InvalidData(_))));
    }

    #[test]
    fn reject_unknown_compression() {
        let mut input = HEADER_4BPP.to_vec();
        input[12] = 9;
        let result = RasterHeader::read(&mut input.as_slice(), 40);
        assert!(matches!(result, Err(DecodeError::InvalidData(_))));
    }

    #[test]
    fn derive_xor_and_and_headers() {
        let mut input = HEADER_4BPP.to_vec();
        input[12] = 2; // BI_RLE4
        let header = RasterHeader::read(&mut input.as_slice(), 40).unwrap();
        let xor = header.xor_header();
        let and = header.and_header();
        assert_eq!(xor.height(), 3);
        assert_eq!(and.height(), 3);
        assert_eq!(xor.width(), 5);
        assert_eq!(and.width(), 5);
        assert_eq!(xor.bits_per_pixel(), 4);
        assert_eq!(xor.compression(), Compression::Rle4);
        assert_eq!(and.bits_per_pixel(), 1);
        assert_eq!(and.colors_used(), 2);
        assert_eq!(and.compression(), Compression::Rgb);
        assert_eq!(header.height(), 6);
    }

    #[test]
    fn partial_color_table() {
        let mut input = HEADER_4BPP.to_vec();
        input[28] = 3; // colors used
        let header = RasterHeader::read(&mut input.as_slice(), 40).unwrap();
        assert_eq!(header.color_table_len(BmpDepth::Four), 3);
        assert_eq!(header.color_table_len(BmpDepth::TwentyFour), 0);
    }
}

//===========================================================================//
