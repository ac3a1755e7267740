use crate::error::DecodeError;
use crate::header::RasterHeader;
use crate::icondir::IconDirEntry;
use std::io::{self, Read, Write};

//===========================================================================//

// Size limits for decoded images:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// A decoded image: a buffer of RGBA pixels.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconImage {
    width: u32,
    height: u32,
    rgba_data: Vec<u8>,
}

impl IconImage {
    /// Creates a new image with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    /// Panics if the dimensions are out of range or if `rgba_data` is the
    /// wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> IconImage {
        if width < MIN_WIDTH {
            panic!(
                "Invalid width (was {}, but must be at least {})",
                width, MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            panic!(
                "Invalid height (was {}, but must be at least {})",
                height, MIN_HEIGHT
            );
        }
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        IconImage { width, height, rgba_data }
    }

    /// Decodes an image from a PNG file.  Returns an error if the PNG data is
    /// malformed or can't be decoded.
    pub fn read_png<R: Read>(reader: R) -> Result<IconImage, DecodeError> {
        let mut decoder = png::Decoder::new(reader);
        // Expand palettes and sub-byte depths, and strip 16-bit samples, so
        // that every PNG comes out as 8-bit gray, gray+alpha, RGB or RGBA.
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16,
        );
        let mut png_reader = decoder.read_info()?;
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        let info = png_reader.next_frame(&mut buffer)?;
        buffer.truncate(info.buffer_size());
        if info.width < MIN_WIDTH || info.height < MIN_HEIGHT {
            invalid_data!(
                "Invalid PNG dimensions ({}x{})",
                info.width,
                info.height
            );
        }
        if info.bit_depth != png::BitDepth::Eight {
            invalid_data!("Unexpected PNG output depth: {:?}", info.bit_depth);
        }
        let rgba_data = match info.color_type {
            png::ColorType::Rgba => buffer,
            png::ColorType::Rgb => {
                let mut rgba = Vec::with_capacity(buffer.len() / 3 * 4);
                for rgb in buffer.chunks_exact(3) {
                    rgba.extend_from_slice(rgb);
                    rgba.push(u8::MAX);
                }
                rgba
            }
            png::ColorType::GrayscaleAlpha => {
                let mut rgba = Vec::with_capacity(buffer.len() * 2);
                for pair in buffer.chunks_exact(2) {
                    let (gray, alpha) = (pair[0], pair[1]);
                    rgba.extend_from_slice(&[gray, gray, gray, alpha]);
                }
                rgba
            }
            png::ColorType::Grayscale => {
                let mut rgba = Vec::with_capacity(buffer.len() * 4);
                for gray in buffer.into_iter() {
                    rgba.extend_from_slice(&[gray, gray, gray, u8::MAX]);
                }
                rgba
            }
            png::ColorType::Indexed => {
                invalid_data!("PNG palette was not expanded");
            }
        };
        Ok(IconImage::from_rgba_data(info.width, info.height, rgba_data))
    }

    /// Encodes the image as an RGBA PNG file.
    pub fn write_png<W: Write>(&self, writer: W) -> io::Result<()> {
        match self.write_png_enc(writer) {
            Ok(()) => Ok(()),
            Err(png::EncodingError::IoError(error)) => Err(error),
            Err(png::EncodingError::Format(error)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("PNG format error: {}", error),
            )),
            Err(png::EncodingError::LimitsExceeded) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "PNG limits exceeded",
            )),
            Err(png::EncodingError::Parameter(error)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("PNG parameter error: {}", error),
            )),
        }
    }

    fn write_png_enc<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba_data)?;
        writer.finish()
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        &self.rgba_data
    }

    pub(crate) fn rgba_data_mut(&mut self) -> &mut [u8] {
        &mut self.rgba_data
    }

    /// Returns the RGBA value of the pixel at column `x` and row `y`
    /// (counting down from the top), or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = 4 * (y as usize * self.width as usize + x as usize);
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.rgba_data[start..start + 4]);
        Some(rgba)
    }
}

//===========================================================================//

/// A decoded image together with the BMP header it was decoded from, if any.
#[derive(Clone, Debug)]
pub struct BmpImage {
    image: IconImage,
    header: Option<RasterHeader>,
}

impl BmpImage {
    pub(crate) fn new(image: IconImage, header: Option<RasterHeader>) -> Self {
        BmpImage { image, header }
    }

    /// Returns the decoded pixels.
    pub fn image(&self) -> &IconImage {
        &self.image
    }

    /// Consumes this value, returning the decoded pixels.
    pub fn into_image(self) -> IconImage {
        self.image
    }

    /// Returns the BMP header of the encoded image, or `None` if the image
    /// was not BMP-encoded.
    pub fn header(&self) -> Option<&RasterHeader> {
        self.header.as_ref()
    }

    /// Returns the width declared in the BMP header.
    pub fn width(&self) -> Option<i32> {
        self.header.as_ref().map(RasterHeader::width)
    }

    /// Returns the height declared in the BMP header.  For an icon's BMP
    /// header this counts both the color rows and the mask rows.
    pub fn height(&self) -> Option<i32> {
        self.header.as_ref().map(RasterHeader::height)
    }

    /// Returns the color depth (bits-per-pixel) declared in the BMP header.
    pub fn colour_depth(&self) -> Option<u16> {
        self.header.as_ref().map(RasterHeader::bits_per_pixel)
    }

    /// Returns the number of possible colors for the declared color depth.
    pub fn colour_count(&self) -> Option<u64> {
        self.colour_depth().and_then(colour_count)
    }

    /// Returns true if the encoded image uses a color table.
    pub fn is_indexed(&self) -> bool {
        self.colour_depth().map_or(false, |depth| depth <= 8)
    }
}

//===========================================================================//

/// One decoded image from an ICO file, along with where it came from.
#[derive(Clone, Debug)]
pub struct DecodedIcon {
    bmp: BmpImage,
    entry: IconDirEntry,
    png_compressed: bool,
    icon_index: usize,
}

impl DecodedIcon {
    pub(crate) fn new(
        bmp: BmpImage,
        entry: IconDirEntry,
        png_compressed: bool,
        icon_index: usize,
    ) -> DecodedIcon {
        DecodedIcon { bmp, entry, png_compressed, icon_index }
    }

    /// Returns the decoded image and its BMP header.
    pub fn bmp(&self) -> &BmpImage {
        &self.bmp
    }

    /// Returns the decoded pixels.
    pub fn image(&self) -> &IconImage {
        self.bmp.image()
    }

    /// Consumes this value, returning the decoded pixels.
    pub fn into_image(self) -> IconImage {
        self.bmp.into_image()
    }

    /// Returns the BMP header of the encoded image, or `None` if the image
    /// was stored as a PNG.
    pub fn raster_header(&self) -> Option<&RasterHeader> {
        self.bmp.header()
    }

    /// Returns the directory entry describing this image.
    pub fn entry(&self) -> &IconDirEntry {
        &self.entry
    }

    /// Returns true if the image was stored as a PNG, or false if it was
    /// stored as a BMP.
    pub fn is_png(&self) -> bool {
        self.png_compressed
    }

    /// Returns the zero-based position of this image in the ICO directory.
    pub fn icon_index(&self) -> usize {
        self.icon_index
    }

    /// Returns the width declared in the directory entry, in pixels.
    pub fn width(&self) -> u32 {
        self.entry.width()
    }

    /// Returns the height declared in the directory entry, in pixels.
    pub fn height(&self) -> u32 {
        self.entry.height()
    }

    /// Returns the color depth declared in the directory entry.
    pub fn colour_depth(&self) -> u16 {
        self.entry.bits_per_pixel()
    }

    /// Returns the number of possible colors for the declared color depth.
    pub fn colour_count(&self) -> Option<u64> {
        colour_count(self.colour_depth())
    }

    /// Returns true if the declared color depth implies a color table.
    pub fn is_indexed(&self) -> bool {
        self.colour_depth() <= 8
    }
}

// 32-bpp images carry 24 bits of color plus alpha.
fn colour_count(bits_per_pixel: u16) -> Option<u64> {
    let bits = if bits_per_pixel == 32 { 24 } else { bits_per_pixel };
    if bits >= 64 {
        None
    } else {
        Some(1u64 << bits)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{colour_count, BmpImage, IconImage};

    #[test]
    fn pixel_lookup() {
        let rgba = (0..16).collect::<Vec<u8>>();
        let image = IconImage::from_rgba_data(2, 2, rgba);
        assert_eq!(image.pixel(0, 0), Some([0, 1, 2, 3]));
        assert_eq!(image.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(image.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.pixel(0, 2), None);
    }

    #[test]
    #[should_panic]
    fn reject_wrong_data_length() {
        IconImage::from_rgba_data(2, 2, vec![0; 15]);
    }

    #[test]
    fn png_round_trip() {
        let rgba = vec![
            0x10, 0x20, 0x30, 0xff, 0x40, 0x50, 0x60, 0x00, //
            0x70, 0x80, 0x90, 0x7f, 0xa0, 0xb0, 0xc0, 0xff,
        ];
        let image = IconImage::from_rgba_data(2, 2, rgba);
        let mut png = Vec::<u8>::new();
        image.write_png(&mut png).unwrap();
        let decoded = IconImage::read_png(png.as_slice()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn read_png_grayscale() {
        let input: &[u8] = b"\
            \x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
            \x00\x00\x00\x02\x00\x00\x00\x02\x08\x00\x00\x00\x00\x57\xdd\x52\
            \xf8\x00\x00\x00\x0e\x49\x44\x41\x54\x78\x9c\x63\xb4\x77\x60\xdc\
            \xef\x00\x00\x04\x08\x01\x81\x86\x2e\xc9\x8d\x00\x00\x00\x00\x49\
            \x45\x4e\x44\xae\x42\x60\x82";
        let image = IconImage::read_png(input).unwrap();
        let rgba: &[u8] = b"\
            \x3f\x3f\x3f\xff\x7f\x7f\x7f\xff\
            \xbf\xbf\xbf\xff\xff\xff\xff\xff";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn colour_counts() {
        assert_eq!(colour_count(1), Some(2));
        assert_eq!(colour_count(8), Some(256));
        assert_eq!(colour_count(32), Some(1 << 24));
        assert_eq!(colour_count(64), None);
    }

    #[test]
    fn headerless_image_has_no_depth() {
        let image = IconImage::from_rgba_data(1, 1, vec![0; 4]);
        let bmp = BmpImage::new(image, None);
        assert_eq!(bmp.colour_depth(), None);
        assert_eq!(bmp.colour_count(), None);
        assert!(!bmp.is_indexed());
        assert_eq!(bmp.width(), None);
    }
}

//===========================================================================//
