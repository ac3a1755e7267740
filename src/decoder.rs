use crate::counting::CountingReader;
use crate::error::DecodeError;
use crate::header::{RasterHeader, BMP_HEADER_LEN};
use crate::icondir::{IconDir, IconDirEntry};
use crate::image::{BmpImage, DecodedIcon, IconImage};
use crate::mask::{apply_and_mask, AND_COLOR_TABLE};
use crate::raster::{decode_raster, decode_raster_with_table};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

//===========================================================================//

// The signature that all PNG files start with.
const PNG_SIGNATURE: [u8; 8] =
    [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// The two halves of the PNG signature, as read by a little-endian reader.
const PNG_MAGIC_LE: u32 = u32::from_le_bytes([0x89, b'P', b'N', b'G']);
const PNG_MAGIC2_LE: u32 = u32::from_le_bytes([0x0d, 0x0a, 0x1a, 0x0a]);

//===========================================================================//

/// How one image in an ICO file is encoded, as told by its first four bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EntryFormat {
    Bmp,
    Png,
}

impl EntryFormat {
    fn from_header_word(word: u32) -> Option<EntryFormat> {
        match word {
            BMP_HEADER_LEN => Some(EntryFormat::Bmp),
            PNG_MAGIC_LE => Some(EntryFormat::Png),
            _ => None,
        }
    }
}

//===========================================================================//

/// Reads just the header and directory of an ICO file.
pub fn read_directory<R: Read>(
    mut reader: R,
) -> Result<IconDir, DecodeError> {
    IconDir::read(&mut reader)
}

/// Decodes every image in an ICO file, in directory order, together with
/// its metadata.
///
/// The image data must be laid out exactly as the directory declares: each
/// image must start at its declared file offset, in directory order, since
/// the reader is never rewound.  Decoding stops at the first image that fails
/// and returns its error wrapped in `DecodeError::Image`.
pub fn decode<R: Read>(reader: R) -> Result<Vec<DecodedIcon>, DecodeError> {
    let mut reader = CountingReader::new(reader);
    let icondir = IconDir::read(&mut reader)?;
    let entries = icondir.entries();
    log::debug!(
        "ICO directory has {} entries; image data starts at {}",
        entries.len(),
        icondir.data_start()
    );
    let mut icons = Vec::<DecodedIcon>::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let is_last = index + 1 == entries.len();
        let icon = decode_entry(&mut reader, entry, index, is_last)
            .map_err(|error| error.in_image(index))?;
        icons.push(icon);
    }
    Ok(icons)
}

/// Decodes every image in an ICO file, in directory order, discarding the
/// metadata.
pub fn decode_images<R: Read>(
    reader: R,
) -> Result<Vec<IconImage>, DecodeError> {
    Ok(decode(reader)?.into_iter().map(DecodedIcon::into_image).collect())
}

/// Opens and decodes the ICO file at `path`.  See `decode`.
pub fn decode_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<DecodedIcon>, DecodeError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    // The file is closed when the reader is dropped, whether or not
    // decoding succeeded.
    let result = decode(BufReader::new(file));
    log::debug!("Closed ICO file {:?}", path);
    result
}

/// Opens and decodes the ICO file at `path`, discarding the metadata.
pub fn decode_images_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<IconImage>, DecodeError> {
    Ok(decode_file(path)?.into_iter().map(DecodedIcon::into_image).collect())
}

//===========================================================================//

fn decode_entry<R: Read>(
    reader: &mut CountingReader<R>,
    entry: &IconDirEntry,
    index: usize,
    is_last: bool,
) -> Result<DecodedIcon, DecodeError> {
    let position = reader.position();
    if position != entry.data_offset() as u64 {
        return Err(DecodeError::OffsetMismatch {
            index,
            expected: entry.data_offset(),
            actual: position,
        });
    }
    let word = reader.read_u32::<LittleEndian>()?;
    log::debug!("Image #{} @ {} header = {:#010x}", index, position, word);
    let icon = match EntryFormat::from_header_word(word) {
        Some(EntryFormat::Bmp) => {
            decode_bmp_entry(reader, entry, index, is_last, word)?
        }
        Some(EntryFormat::Png) => decode_png_entry(reader, entry, index)?,
        None => return Err(DecodeError::UnrecognizedFormat { index, word }),
    };
    let image = icon.image();
    if image.width() != entry.width() || image.height() != entry.height() {
        log::warn!(
            "Image #{} is {}x{}, but directory says {}x{}",
            index,
            image.width(),
            image.height(),
            entry.width(),
            entry.height()
        );
    }
    Ok(icon)
}

fn decode_png_entry<R: Read>(
    reader: &mut CountingReader<R>,
    entry: &IconDirEntry,
    index: usize,
) -> Result<DecodedIcon, DecodeError> {
    if reader.read_u32::<LittleEndian>()? != PNG_MAGIC2_LE {
        return Err(DecodeError::MalformedPngSignature { index });
    }
    let body_len = match entry.data_size().checked_sub(8) {
        Some(len) => len as u64,
        None => invalid_data!(
            "PNG image data size too small (was {}, but must be at least 8)",
            entry.data_size()
        ),
    };
    let mut data = PNG_SIGNATURE.to_vec();
    let num_read = reader.by_ref().take(body_len).read_to_end(&mut data)?;
    if (num_read as u64) < body_len {
        return Err(DecodeError::TruncatedStream { index });
    }
    let image = IconImage::read_png(data.as_slice())?;
    let bmp = BmpImage::new(image, None);
    Ok(DecodedIcon::new(bmp, entry.clone(), true, index))
}

fn decode_bmp_entry<R: Read>(
    reader: &mut CountingReader<R>,
    entry: &IconDirEntry,
    index: usize,
    is_last: bool,
    header_size: u32,
) -> Result<DecodedIcon, DecodeError> {
    let header = RasterHeader::read(reader, header_size)?;
    let xor_header = header.xor_header();
    let and_header = header.and_header();
    let mut image = decode_raster(&xor_header, reader)?;
    if header.bits_per_pixel() == 32 {
        // The alpha channel already holds the transparency, so the AND mask
        // that follows is redundant and gets skipped.
        let data_size = image.width() as i64 * image.height() as i64 * 4;
        let skip =
            entry.data_size() as i64 - header.size() as i64 - data_size;
        if skip > 0 {
            let skipped = reader.skip(skip as u64)?;
            if skipped < skip as u64 {
                if !is_last {
                    return Err(DecodeError::TruncatedStream { index });
                }
                // A short mask is tolerated on the last image only.
                log::warn!(
                    "Image #{} ended {} bytes short of its declared size",
                    index,
                    skip as u64 - skipped
                );
            }
        }
    } else {
        let and =
            decode_raster_with_table(&and_header, reader, &AND_COLOR_TABLE)?;
        apply_and_mask(&mut image, &and)?;
    }
    Ok(DecodedIcon::new(
        BmpImage::new(image, Some(header)),
        entry.clone(),
        false,
        index,
    ))
}

//===========================================================================//


//===========================================================================//
