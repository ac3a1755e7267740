use crate::error::DecodeError;
use byteorder::{LittleEndian, ReadBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::Read;

//===========================================================================//

// The size of the ICONDIR header and of each ICONDIRENTRY, in bytes.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

//===========================================================================//

/// The header and directory of an ICO file: everything that precedes the
/// image data.
#[derive(Clone, Debug)]
pub struct IconDir {
    reserved: u16,
    type_number: u16,
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Reads the ICONDIR header and all of the directory entries.  Neither
    /// the reserved field nor the resource type is required to hold any
    /// particular value.
    pub(crate) fn read<R: Read>(
        reader: &mut R,
    ) -> Result<IconDir, DecodeError> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            log::warn!(
                "Reserved field value in ICONDIR was {}, but should be 0",
                reserved
            );
        }
        let type_number = reader.read_u16::<LittleEndian>()?;
        if ResourceType::from_type_word(type_number).is_none() {
            log::warn!("Unknown resource type ({})", type_number);
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        for _ in 0..num_entries {
            entries.push(IconDirEntry::read(reader)?);
        }
        Ok(IconDir { reserved, type_number, entries })
    }

    /// Returns the value of the reserved field, which should be zero.
    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    /// Returns the raw resource type number from the header.
    pub fn type_number(&self) -> u16 {
        self.type_number
    }

    /// Returns the type of resource stored in the file, or `None` if the
    /// header's type number is not recognized.
    pub fn resource_type(&self) -> Option<ResourceType> {
        ResourceType::from_type_word(self.type_number)
    }

    /// Returns the entries of the directory, in directory order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Returns the file offset at which the image data begins.
    pub(crate) fn data_start(&self) -> u64 {
        let num_entries = self.entries.len() as u64;
        ICONDIR_LEN as u64 + ICONDIRENTRY_LEN as u64 * num_entries
    }
}

//===========================================================================//

/// The kind of file named by the type word of an ICONDIR header.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ResourceType {
    /// An ICO file (type word 1).
    Icon,
    /// A CUR file (type word 2).  Hotspots are not interpreted.
    Cursor,
}

impl ResourceType {
    fn from_type_word(type_number: u16) -> Option<ResourceType> {
        match type_number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }
}

//===========================================================================//

/// One ICONDIRENTRY: the declared size, depth and location of one image.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDirEntry {
    width_byte: u8,
    height_byte: u8,
    num_colors: u8,
    reserved: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
}

impl IconDirEntry {
    pub(crate) fn read<R: Read>(
        reader: &mut R,
    ) -> Result<IconDirEntry, DecodeError> {
        let width_byte = reader.read_u8()?;
        let height_byte = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_size = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        Ok(IconDirEntry {
            width_byte,
            height_byte,
            num_colors,
            reserved,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
        })
    }

    /// Returns the declared width of the image, in pixels.  The
    /// ICONDIRENTRY struct uses only one byte for the width, so a byte of
    /// zero stands for 256.
    pub fn width(&self) -> u32 {
        if self.width_byte == 0 {
            256
        } else {
            self.width_byte as u32
        }
    }

    /// Returns the declared height of the image, in pixels, with a byte of
    /// zero standing for 256.
    pub fn height(&self) -> u32 {
        if self.height_byte == 0 {
            256
        } else {
            self.height_byte as u32
        }
    }

    /// Returns the raw width byte.
    pub fn width_byte(&self) -> u8 {
        self.width_byte
    }

    /// Returns the raw height byte.
    pub fn height_byte(&self) -> u8 {
        self.height_byte
    }

    /// Returns the declared number of colors in the color table (zero if
    /// there is none, or if it has 256 entries).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the reserved byte, which should be zero.
    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    /// Returns the number of color planes (or, in a CUR file, the hotspot's
    /// x coordinate).
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the declared bits-per-pixel (or, in a CUR file, the hotspot's
    /// y coordinate).
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the declared length of the image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns the declared file offset of the image data.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{IconDir, ResourceType};
    
    #[test]
    fn read_empty_icon_set() {
        let input: &[u8] = b"\x00\x00\x01\x00\x00\x00";
        let icondir = IconDir::read(&mut &input[..]).unwrap();
        assert_eq!(icondir.resource_type(), Some(ResourceType::Icon));
        assert_eq!(icondir.entries().len(), 0);
        assert_eq!(icondir.data_start(), 6);
    }

    #[test]
    fn read_empty_cursor_set() {
        let input: &[u8] = b"\x00\x00\x02\x00\x00\x00";
        let icondir = IconDir::read(&mut &input[..]).unwrap();
        assert_eq!(icondir.resource_type(), Some(ResourceType::Cursor));
        assert_eq!(icondir.entries().len(), 0);
    }

    #[test]
    fn tolerate_odd_header_fields() {
        let input: &[u8] = b"\x07\x00\x09\x00\x00\x00";
        let icondir = IconDir::read(&mut &input[..]).unwrap();
        assert_eq!(icondir.reserved(), 7);
        assert_eq!(icondir.type_number(), 9);
        assert_eq!(icondir.resource_type(), None);
    }

    #[test]
    fn type_words() {
        assert_eq!(ResourceType::from_type_word(0), None);
        assert_eq!(ResourceType::from_type_word(1), Some(ResourceType::Icon));
        assert_eq!(
            ResourceType::from_type_word(2),
            Some(ResourceType::Cursor)
        );
        assert_eq!(ResourceType::from_type_word(0x0100), None);
    }

    #[test]
    fn read_entries() {
        let input: &[u8] = b"\
            \x00\x00\x01\x00\x02\x00\
            \
            \x10\x20\x00\x00\x01\x00\x20\x00\
            \x68\x04\x00\x00\x26\x00\x00\x00\
            \
            \x00\x00\x10\x01\x01\x00\x04\x00\
            \x28\x01\x00\x00\x8e\x04\x00\x00";
        let icondir = IconDir::read(&mut &input[..]).unwrap();
        assert_eq!(icondir.data_start(), 38);
        let entries = icondir.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].width(), 16);
        assert_eq!(entries[0].height(), 32);
        assert_eq!(entries[0].bits_per_pixel(), 32);
        assert_eq!(entries[0].data_size(), 1128);
        assert_eq!(entries[0].data_offset(), 38);
        assert_eq!(entries[1].width_byte(), 0);
        assert_eq!(entries[1].width(), 256);
        assert_eq!(entries[1].height(), 256);
        assert_eq!(entries[1].num_colors(), 16);
        assert_eq!(entries[1].reserved(), 1);
        assert_eq!(entries[1].color_planes(), 1);
        assert_eq!(entries[1].data_size(), 296);
        assert_eq!(entries[1].data_offset(), 1166);
    }

    #[test]
    fn truncated_directory() {
        let input: &[u8] = b"\x00\x00\x01\x00\x01\x00\x10\x10\x00";
        assert!(IconDir::read(&mut &input[..]).is_err());
    }
}

//===========================================================================//
