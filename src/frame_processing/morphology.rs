use gobees_common::{binarize, FrameExt, Mask};
use image::GrayImage;
use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

use crate::definitions::{DEFAULT_CLOSE_RADIUS, DEFAULT_OPEN_RADIUS, MASK_THRESHOLD};
use crate::frame_processing::FrameProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    /// Chessboard radius of the opening. Regions that do not contain a
    /// `(2 * open_radius + 1)` square anywhere are removed.
    pub open_radius: u8,

    /// Chessboard radius of the closing applied after the opening. Joins
    /// fragments of one bee split by legs, wings or stripes. 0 disables it.
    pub close_radius: u8,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            open_radius: DEFAULT_OPEN_RADIUS,
            close_radius: DEFAULT_CLOSE_RADIUS,
        }
    }
}

/// Removes foreground noise from a mask.
#[derive(Debug, Clone, Default)]
pub struct Morphology {
    cfg: MorphologyConfig,
}

impl Morphology {
    pub fn from_config(cfg: MorphologyConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MorphologyConfig {
        &self.cfg
    }

    #[must_use]
    pub fn clean(&self, mask: &GrayImage) -> Option<Mask> {
        if mask.is_degenerate() {
            debug!(target: "bee_count", "morphology: skipping empty mask");
            return None;
        }

        //anything that is not clearly foreground is background, otherwise the
        //distance transforms would treat faint grey pixels as foreground.
        let tmp = binarize(mask, MASK_THRESHOLD);

        let tmp = if self.cfg.open_radius > 0 {
            imageproc::morphology::open(&tmp, Norm::LInf, self.cfg.open_radius)
        } else {
            tmp
        };

        let tmp = if self.cfg.close_radius > 0 {
            imageproc::morphology::close(&tmp, Norm::LInf, self.cfg.close_radius)
        } else {
            tmp
        };

        Some(tmp)
    }
}

impl FrameProcessor for Morphology {
    fn process(&mut self, frame: &GrayImage) -> Option<GrayImage> {
        self.clean(frame)
    }
}

#[cfg(test)]
mod test {
    use gobees_common::FrameExt;
    use image::{GrayImage, Luma};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    use super::*;

    #[test]
    fn test_small_specks_are_removed() {
        let mut img = GrayImage::new(30, 30);
        img.put_pixel(3, 3, Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(2, 2), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(20, 5).of_size(1, 8), Luma([255]));

        let act = Morphology::default().clean(&img).unwrap();
        assert!(act.is_all_background());
    }

    #[test]
    fn test_large_region_survives() {
        let mut img = GrayImage::new(30, 30);
        draw_filled_rect_mut(&mut img, Rect::at(8, 8).of_size(10, 10), Luma([255]));
        img.put_pixel(1, 1, Luma([255]));

        let act = Morphology::default().clean(&img).unwrap();

        assert_eq!(act.get_pixel(1, 1), &Luma([0]));
        assert_eq!(act.count_foreground(), 100);
        assert_eq!(act.get_pixel(8, 8), &Luma([255]));
        assert_eq!(act.get_pixel(17, 17), &Luma([255]));
    }

    #[test]
    fn test_close_joins_fragments() {
        let mut img = GrayImage::new(30, 20);
        draw_filled_rect_mut(&mut img, Rect::at(5, 5).of_size(6, 6), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(13, 5).of_size(6, 6), Luma([255]));

        let joined = Morphology::default().clean(&img).unwrap();
        assert_eq!(joined.get_pixel(12, 8), &Luma([255]));

        let cfg = MorphologyConfig {
            close_radius: 0,
            ..MorphologyConfig::default()
        };
        let split = Morphology::from_config(cfg).clean(&img).unwrap();
        assert_eq!(split.get_pixel(12, 8), &Luma([0]));
    }

    #[test]
    fn test_output_is_binary() {
        let mut img = GrayImage::new(12, 12);
        draw_filled_rect_mut(&mut img, Rect::at(2, 2).of_size(8, 8), Luma([200]));
        draw_filled_rect_mut(&mut img, Rect::at(4, 4).of_size(4, 4), Luma([90]));

        let act = Morphology::default().clean(&img).unwrap();
        assert!(act.is_binary());
    }

    #[test]
    fn test_degenerate_frames() {
        let mut morf = Morphology::default();
        assert!(morf.process(&GrayImage::new(0, 0)).is_none());
        assert!(morf.process_opt(None).is_none());
    }
}
