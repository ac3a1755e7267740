use crate::error::DecodeError;
use crate::image::IconImage;
use crate::raster::ColorEntry;

//===========================================================================//

/// The color table used to decode an icon's AND mask: a clear bit is an
/// opaque pixel and a set bit is a transparent one.
pub(crate) const AND_COLOR_TABLE: [ColorEntry; 2] = [
    ColorEntry::new(255, 255, 255, 255),
    ColorEntry::new(0, 0, 0, 0),
];

/// Replaces the alpha channel of every pixel in `xor` with the value sampled
/// from the decoded AND mask at the same position.  Red, green and blue are
/// left untouched.
pub(crate) fn apply_and_mask(
    xor: &mut IconImage,
    and: &IconImage,
) -> Result<(), DecodeError> {
    if xor.width() != and.width() || xor.height() != and.height() {
        invalid_data!(
            "AND mask is {}x{}, but color bitmap is {}x{}",
            and.width(),
            and.height(),
            xor.width(),
            xor.height()
        );
    }
    let mask = and.rgba_data().chunks_exact(4);
    for (pixel, sample) in xor.rgba_data_mut().chunks_exact_mut(4).zip(mask) {
        pixel[3] = sample[3];
    }
    Ok(())
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{apply_and_mask, AND_COLOR_TABLE};
    use crate::image::IconImage;

    #[test]
    fn mask_replaces_alpha_only() {
        let mut xor = IconImage::from_rgba_data(
            2,
            1,
            vec![0x11, 0x22, 0x33, 0x80, 0x44, 0x55, 0x66, 0x80],
        );
        let and = IconImage::from_rgba_data(
            2,
            1,
            vec![0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00],
        );
        apply_and_mask(&mut xor, &and).unwrap();
        assert_eq!(
            xor.rgba_data(),
            &[0x11, 0x22, 0x33, 0xff, 0x44, 0x55, 0x66, 0x00]
        );
    }

    #[test]
    fn mismatched_dimensions() {
        let mut xor = IconImage::from_rgba_data(2, 1, vec![0; 8]);
        let and = IconImage::from_rgba_data(1, 2, vec![0; 8]);
        assert!(apply_and_mask(&mut xor, &and).is_err());
    }

    #[test]
    fn and_table_is_binary() {
        assert_eq!(AND_COLOR_TABLE[0].alpha, 255);
        assert_eq!(AND_COLOR_TABLE[1].alpha, 0);
    }
}

//===========================================================================//
