use image::{GenericImageView, GrayImage, Luma};

/// A binary frame. Every pixel is either [`MASK_BACKGROUND`] or [`MASK_FOREGROUND`].
pub type Mask = GrayImage;

pub const MASK_BACKGROUND: u8 = 0;
pub const MASK_FOREGROUND: u8 = 255;

pub trait FrameExt {
    type Item: GenericImageView<Pixel = Luma<u8>>;

    fn frame(&self) -> &Self::Item;

    /// A frame with no pixels at all. Such a frame is never handed to a
    /// processing stage.
    fn is_degenerate(&self) -> bool {
        let (width, height) = self.frame().dimensions();
        width == 0 || height == 0
    }

    fn is_binary(&self) -> bool {
        self.frame()
            .pixels()
            .all(|(_x, _y, Luma([pix]))| pix == MASK_BACKGROUND || pix == MASK_FOREGROUND)
    }

    fn is_all_background(&self) -> bool {
        self.frame()
            .pixels()
            .all(|(_x, _y, Luma([pix]))| pix == MASK_BACKGROUND)
    }

    fn count_foreground(&self) -> usize {
        self.frame()
            .pixels()
            .filter(|(_x, _y, Luma([pix]))| *pix != MASK_BACKGROUND)
            .count()
    }
}

impl<T> FrameExt for T
where
    T: GenericImageView<Pixel = Luma<u8>>,
{
    type Item = T;

    fn frame(&self) -> &Self::Item {
        self
    }
}

/// Force a frame into a mask: pixels strictly brighter than `thresh` become
/// foreground, everything else background.
#[must_use]
pub fn binarize(frame: &GrayImage, thresh: u8) -> Mask {
    use imageproc::contrast::ThresholdType::Binary;
    imageproc::contrast::threshold(frame, thresh, Binary)
}
