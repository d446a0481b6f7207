use image::{GenericImage, GrayImage, Luma, Rgb, RgbImage};

/// Expand a grayscale frame into RGB so it can share a canvas with
/// colourised masks.
#[must_use]
pub fn gray_to_rgb(img: &GrayImage) -> RgbImage {
    let mut ret = RgbImage::new(img.width(), img.height());
    for (&Luma([src_pix]), dst_pix) in img.pixels().zip(ret.pixels_mut()) {
        *dst_pix = Rgb([src_pix, src_pix, src_pix]);
    }
    ret
}

///Arrange a sequence of images side by side in a row, separated by `gap`
///pixels of black.
///The images must all be the same size.
///
/// Returns None if there are no images
/// Panics if the images are not all the same size
#[must_use]
pub fn row_images_rgb(images: &[RgbImage], gap: u32) -> Option<RgbImage> {
    let (img_x, img_y) = images.first().map(RgbImage::dimensions)?;
    assert!(images
        .iter()
        .all(|img| img.dimensions() == (img_x, img_y)));

    let len = u32::try_from(images.len()).expect("unreachable");
    let mut ret = RgbImage::new(len * img_x + (len - 1) * gap, img_y);

    for (col_no, img) in images.iter().enumerate() {
        let x_coord = u32::try_from(col_no).expect("unreachable") * (img_x + gap);
        ret.copy_from(img, x_coord, 0)
            .expect("unreachable due to above assertion about image dimensions");
    }

    Some(ret)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_row_images_empty() {
        assert!(row_images_rgb(&[], 2).is_none());
    }

    #[test]
    fn test_row_images_layout() {
        let red = RgbImage::from_pixel(2, 3, Rgb([255, 0, 0]));
        let blue = RgbImage::from_pixel(2, 3, Rgb([0, 0, 255]));

        let row = row_images_rgb(&[red, blue], 1).unwrap();

        assert_eq!(row.dimensions(), (5, 3));
        assert_eq!(row.get_pixel(1, 0), &Rgb([255, 0, 0]));
        assert_eq!(row.get_pixel(2, 1), &Rgb([0, 0, 0]));
        assert_eq!(row.get_pixel(3, 2), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_gray_to_rgb() {
        let gray = GrayImage::from_pixel(2, 2, Luma([77]));
        let rgb = gray_to_rgb(&gray);
        assert!(rgb.pixels().all(|pix| *pix == Rgb([77, 77, 77])));
    }
}
