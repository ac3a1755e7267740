//===========================================================================//

/// A bits-per-pixel value that the raster decoder knows how to unpack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            16 => Some(BmpDepth::Sixteen),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::Sixteen => 16,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the largest color table this depth can index, or zero for
    /// direct-color depths.
    pub(crate) fn max_colors(&self) -> usize {
        match *self {
            BmpDepth::One => 2,
            BmpDepth::Four => 16,
            BmpDepth::Eight => 256,
            _ => 0,
        }
    }

    /// Returns the number of bytes of pixel data in one row of the given
    /// width, not counting the padding to a four-byte boundary.
    pub(crate) fn row_data_size(&self, width: u32) -> usize {
        ((width as usize) * (self.bits_per_pixel() as usize) + 7) / 8
    }

    /// Returns the number of padding bytes that follow each row of the given
    /// width.
    pub(crate) fn row_padding_size(&self, width: u32) -> usize {
        let row_data_size = self.row_data_size(width);
        ((row_data_size + 3) / 4) * 4 - row_data_size
    }
}

//===========================================================================//


//===========================================================================//
