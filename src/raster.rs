use crate::bmpdepth::BmpDepth;
use crate::error::DecodeError;
use crate::header::{Compression, RasterHeader};
use crate::image::IconImage;
use byteorder::{LittleEndian, ReadBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

//===========================================================================//

/// One entry in a BMP color table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ColorEntry {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
    /// Alpha channel (the "reserved" byte of an RGBQUAD)
    pub alpha: u8,
}

impl ColorEntry {
    /// Creates a new color table entry.
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> ColorEntry {
        ColorEntry { red, green, blue, alpha }
    }

    /// Reads an RGBQUAD from a BMP color table.  The reserved byte is
    /// ignored and the color is treated as opaque.
    fn read<R: Read>(reader: &mut R) -> Result<ColorEntry, DecodeError> {
        let blue = reader.read_u8()?;
        let green = reader.read_u8()?;
        let red = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        Ok(ColorEntry::new(red, green, blue, u8::MAX))
    }
}

//===========================================================================//

/// Decodes the pixel data described by `header`, reading the color table
/// (if the bit depth calls for one) from the stream first.
pub(crate) fn decode_raster<R: Read>(
    header: &RasterHeader,
    reader: &mut R,
) -> Result<IconImage, DecodeError> {
    let depth = validate(header)?;
    let num_colors = header.color_table_len(depth);
    let mut color_table = Vec::<ColorEntry>::with_capacity(num_colors);
    for _ in 0..num_colors {
        color_table.push(ColorEntry::read(reader)?);
    }
    read_pixels(header, depth, reader, &color_table)
}

/// Decodes the pixel data described by `header` using the given color
/// table in place of one read from the stream.
pub(crate) fn decode_raster_with_table<R: Read>(
    header: &RasterHeader,
    reader: &mut R,
    color_table: &[ColorEntry],
) -> Result<IconImage, DecodeError> {
    let depth = validate(header)?;
    read_pixels(header, depth, reader, color_table)
}

fn validate(header: &RasterHeader) -> Result<BmpDepth, DecodeError> {
    if header.compression() != Compression::Rgb {
        unsupported!("{:?} compression", header.compression());
    }
    let depth = match BmpDepth::from_bits_per_pixel(header.bits_per_pixel()) {
        Some(depth) => depth,
        None => {
            unsupported!("{} bits-per-pixel", header.bits_per_pixel());
        }
    };
    if header.width() < 1 {
        invalid_data!(
            "Invalid BMP width (was {}, but must be at least 1)",
            header.width()
        );
    }
    if header.height() == 0 {
        invalid_data!("Invalid BMP height (was 0, but must be nonzero)");
    }
    Ok(depth)
}

fn lookup(
    color_table: &[ColorEntry],
    index: u8,
) -> Result<ColorEntry, DecodeError> {
    match color_table.get(index as usize) {
        Some(&color) => Ok(color),
        None => invalid_data!(
            "Color index {} is out of range for a {}-entry color table",
            index,
            color_table.len()
        ),
    }
}

fn read_pixels<R: Read>(
    header: &RasterHeader,
    depth: BmpDepth,
    reader: &mut R,
    color_table: &[ColorEntry],
) -> Result<IconImage, DecodeError> {
    let width = header.width() as u32;
    let height = header.height().unsigned_abs();
    // Rows are stored starting from the *bottom* row, unless the height is
    // negative.
    let bottom_up = header.height() > 0;
    let num_pixels = match width.checked_mul(height) {
        Some(num) => num as usize,
        None => invalid_data!("Width * Height is too large"),
    };
    let row_data_size = depth.row_data_size(width);
    let row_padding_size = depth.row_padding_size(width);
    // All pixel data must be present before the output buffer is allocated.
    let data_len = (row_data_size + row_padding_size) as u64 * height as u64;
    let mut data = Vec::<u8>::new();
    reader.by_ref().take(data_len).read_to_end(&mut data)?;
    if (data.len() as u64) < data_len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "BMP pixel data ended after {} of {} bytes",
                data.len(),
                data_len
            ),
        )
        .into());
    }
    let reader = &mut data.as_slice();
    let mut rgba = vec![u8::MAX; num_pixels * 4];
    let mut row_padding = vec![0; row_padding_size];
    for row in 0..height {
        let dest_row = if bottom_up { height - row - 1 } else { row };
        let mut start = 4 * (dest_row as usize) * (width as usize);
        match depth {
            BmpDepth::One | BmpDepth::Four => {
                let bits = depth.bits_per_pixel() as u32;
                let pixels_per_byte = 8 / bits;
                let index_mask = (1u8 << bits) - 1;
                let mut col = 0;
                for _ in 0..row_data_size {
                    let byte = reader.read_u8()?;
                    for slot in 0..pixels_per_byte {
                        if col == width {
                            break;
                        }
                        let shift = bits * (pixels_per_byte - 1 - slot);
                        let index = (byte >> shift) & index_mask;
                        let color = lookup(color_table, index)?;
                        rgba[start] = color.red;
                        rgba[start + 1] = color.green;
                        rgba[start + 2] = color.blue;
                        rgba[start + 3] = color.alpha;
                        col += 1;
                        start += 4;
                    }
                }
            }
            BmpDepth::Eight => {
                for _ in 0..width {
                    let color = lookup(color_table, reader.read_u8()?)?;
                    rgba[start] = color.red;
                    rgba[start + 1] = color.green;
                    rgba[start + 2] = color.blue;
                    rgba[start + 3] = color.alpha;
                    start += 4;
                }
            }
            BmpDepth::Sixteen => {
                for _ in 0..width {
                    let color = reader.read_u16::<LittleEndian>()?;
                    let red = (color >> 10) & 0x1f;
                    let green = (color >> 5) & 0x1f;
                    let blue = color & 0x1f;
                    rgba[start] = ((red * 255 + 15) / 31) as u8;
                    rgba[start + 1] = ((green * 255 + 15) / 31) as u8;
                    rgba[start + 2] = ((blue * 255 + 15) / 31) as u8;
                    start += 4;
                }
            }
            BmpDepth::TwentyFour => {
                for _ in 0..width {
                    let blue = reader.read_u8()?;
                    let green = reader.read_u8()?;
                    let red = reader.read_u8()?;
                    rgba[start] = red;
                    rgba[start + 1] = green;
                    rgba[start + 2] = blue;
                    start += 4;
                }
            }
            BmpDepth::ThirtyTwo => {
                for _ in 0..width {
                    let blue = reader.read_u8()?;
                    let green = reader.read_u8()?;
                    let red = reader.read_u8()?;
                    let alpha = reader.read_u8()?;
                    rgba[start] = red;
                    rgba[start + 1] = green;
                    rgba[start + 2] = blue;
                    rgba[start + 3] = alpha;
                    start += 4;
                }
            }
        }
        reader.read_exact(&mut row_padding)?;
    }
    Ok(IconImage::from_rgba_data(width, height, rgba))
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{decode_raster, decode_raster_with_table, ColorEntry};
    use crate::error::DecodeError;
    use crate::header::{Compression, RasterHeader};

    fn header(width: i32, height: i32, bits_per_pixel: u16) -> RasterHeader {
        RasterHeader {
            size: 40,
            width,
            height,
            planes: 1,
            bits_per_pixel,
            compression: Compression::Rgb,
            image_size: 0,
            horz_ppm: 0,
            vert_ppm: 0,
            colors_used: 0,
            colors_important: 0,
        }
    }

    #[test]
    fn decode_1bpp_with_stream_color_table() {
        let input: &[u8] = b"\
            \x55\x00\x55\x00\xff\xff\xff\x00\
            \xc0\x00\x00\x00\
            \x40\x00\x00\x00";
        let mut reader = input;
        let image = decode_raster(&header(2, 2, 1), &mut reader).unwrap();
        assert!(reader.is_empty());
        let rgba: &[u8] = b"\
            \x55\x00\x55\xff\xff\xff\xff\xff\
            \xff\xff\xff\xff\xff\xff\xff\xff";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn decode_1bpp_with_given_color_table() {
        let table = [
            ColorEntry::new(255, 255, 255, 255),
            ColorEntry::new(0, 0, 0, 0),
        ];
        let input: &[u8] = b"\x80\x00\x00\x00\x40\x00\x00\x00";
        let mut reader = input;
        let image =
            decode_raster_with_table(&header(2, 2, 1), &mut reader, &table)
                .unwrap();
        assert!(reader.is_empty());
        let rgba: &[u8] = b"\
            \xff\xff\xff\xff\x00\x00\x00\x00\
            \x00\x00\x00\x00\xff\xff\xff\xff";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn decode_24bpp_top_down() {
        let input: &[u8] = b"\
            \x01\x02\x03\x04\x05\x06\x00\x00\
            \x07\x08\x09\x0a\x0b\x0c\x00\x00";
        let mut reader = input;
        let image = decode_raster(&header(2, -2, 24), &mut reader).unwrap();
        assert!(reader.is_empty());
        let rgba: &[u8] = b"\
            \x03\x02\x01\xff\x06\x05\x04\xff\
            \x09\x08\x07\xff\x0c\x0b\x0a\xff";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn decode_32bpp_keeps_alpha() {
        let input: &[u8] = b"\x10\x20\x30\x40";
        let image = decode_raster(&header(1, 1, 32), &mut &input[..]).unwrap();
        assert_eq!(image.rgba_data(), b"\x30\x20\x10\x40");
    }

    #[test]
    fn decode_16bpp() {
        let input: &[u8] = b"\x1f\x7c\x00\x00";
        let image = decode_raster(&header(1, 1, 16), &mut &input[..]).unwrap();
        assert_eq!(image.rgba_data(), b"\xff\x00\xff\xff");
    }

    #[test]
    fn color_index_out_of_range() {
        let mut header = header(1, 1, 8);
        header.colors_used = 1;
        let input: &[u8] = b"\x00\x00\x00\x00\x05\x00\x00\x00";
        let result = decode_raster(&header, &mut &input[..]);
        assert!(matches!(result, Err(DecodeError::InvalidData(_))));
    }

    #[test]
    fn huge_dimensions_without_pixel_data() {
        let input: &[u8] = b"\x00\x00\x00\x00";
        let result = decode_raster(&header(65535, 65535, 32), &mut &input[..]);
        match result {
            Err(DecodeError::Io(error)) => {
                assert_eq!(error.kind(), std::io::ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn reject_zero_width() {
        let result = decode_raster(&header(0, 2, 32), &mut &b""[..]);
        assert!(matches!(result, Err(DecodeError::InvalidData(_))));
    }

    #[test]
    fn reject_compressed_data() {
        let mut header = header(2, 2, 8);
        header.compression = Compression::Rle8;
        let result = decode_raster(&header, &mut &b""[..]);
        assert!(matches!(result, Err(DecodeError::Unsupported(_))));
    }

    #[test]
    fn truncated_pixel_data() {
        let input: &[u8] = b"\x10\x20\x30";
        let result = decode_raster(&header(1, 1, 32), &mut &input[..]);
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }
}

//===========================================================================//
