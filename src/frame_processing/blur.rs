use gobees_common::FrameExt;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::definitions::DEFAULT_BLUR_PASSES;
use crate::frame_processing::FrameProcessor;

//1D binomial kernel. The 2D kernel is the outer product, so weights sum to 16.
const KERNEL: [u32; 3] = [1, 2, 1];
const KERNEL_SHIFT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// How many times the 3x3 kernel is applied.
    pub passes: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_BLUR_PASSES,
        }
    }
}

/// Smooths a frame with a 3x3 binomial kernel. Pixels beyond the edge of the
/// frame are mirrored about the edge pixel (reflect-101), so a uniform frame
/// is left unchanged.
#[derive(Debug, Clone, Default)]
pub struct Blur {
    cfg: BlurConfig,
}

impl Blur {
    pub fn from_config(cfg: BlurConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &BlurConfig {
        &self.cfg
    }

    #[must_use]
    pub fn blur(&self, frame: &GrayImage) -> Option<GrayImage> {
        if frame.is_degenerate() {
            debug!(target: "bee_count", "blur: skipping empty frame");
            return None;
        }

        let mut ret = frame.clone();
        for _ in 0..self.cfg.passes {
            ret = binomial_3x3(&ret);
        }
        Some(ret)
    }
}

impl FrameProcessor for Blur {
    fn process(&mut self, frame: &GrayImage) -> Option<GrayImage> {
        self.blur(frame)
    }
}

//mirror an out-of-range coordinate back into 0..len without repeating the edge pixel
fn reflect_101(idx: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let idx = idx.rem_euclid(period);
    let idx = if idx >= len { period - idx } else { idx };
    idx as u32
}

fn binomial_3x3(src: &GrayImage) -> GrayImage {
    let (width, height) = src.dimensions();

    //horizontal pass. Kept at full precision (max 4 * 255) so that rounding
    //only happens once per pass.
    let idx = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut horz = vec![0u32; width as usize * height as usize];
    for y in 0..height {
        for x in 0..width {
            let acc = KERNEL
                .iter()
                .zip(-1i64..=1)
                .map(|(weight, dx)| {
                    let sx = reflect_101(i64::from(x) + dx, width);
                    let Luma([pix]) = *src.get_pixel(sx, y);
                    weight * u32::from(pix)
                })
                .sum::<u32>();
            horz[idx(x, y)] = acc;
        }
    }

    let mut ret = GrayImage::new(width, height);
    for (x, y, Luma([dst_pix])) in ret.enumerate_pixels_mut() {
        let acc = KERNEL
            .iter()
            .zip(-1i64..=1)
            .map(|(weight, dy)| {
                let sy = reflect_101(i64::from(y) + dy, height);
                weight * horz[idx(x, sy)]
            })
            .sum::<u32>();

        let rounded = (acc + (1 << (KERNEL_SHIFT - 1))) >> KERNEL_SHIFT;
        *dst_pix = rounded.min(u32::from(u8::MAX)) as u8;
    }

    ret
}

#[cfg(test)]
mod test {
    use image::{GrayImage, Luma};

    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 4), 1);
        assert_eq!(reflect_101(0, 4), 0);
        assert_eq!(reflect_101(3, 4), 3);
        assert_eq!(reflect_101(4, 4), 2);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 1), 0);
        assert_eq!(reflect_101(-1, 2), 1);
        assert_eq!(reflect_101(2, 2), 0);
    }

    #[test]
    fn test_single_pass() {
        #[rustfmt::skip]
        let pixs = vec![
            0,   0,   0, 0,
            0, 255, 255, 0,
            0, 255, 255, 0,
            0,   0,   0, 0,
        ];
        let img = GrayImage::from_vec(4, 4, pixs).unwrap();
        let blur = Blur::from_config(BlurConfig { passes: 1 });

        //63.75, 95.625 and 143.4375 before rounding
        #[rustfmt::skip]
        let exp = vec![
             64,  96,  96,  64,
             96, 143, 143,  96,
             96, 143, 143,  96,
             64,  96,  96,  64,
        ];
        assert_eq!(blur.blur(&img).unwrap().into_raw(), exp);
    }

    #[test]
    fn test_uniform_frame_is_unchanged() {
        for val in [0, 1, 128, 254, 255] {
            let img = GrayImage::from_pixel(7, 5, Luma([val]));
            let act = Blur::default().blur(&img).unwrap();
            assert_eq!(act, img);
        }
    }

    #[test]
    fn test_single_row_and_column() {
        let img = GrayImage::from_pixel(1, 1, Luma([200]));
        assert_eq!(Blur::default().blur(&img).unwrap(), img);

        let img = GrayImage::from_vec(3, 1, vec![0, 160, 0]).unwrap();
        let act = Blur::from_config(BlurConfig { passes: 1 })
            .blur(&img)
            .unwrap();
        //vertical axis reflects onto itself so only the horizontal kernel applies
        assert_eq!(act.into_raw(), vec![80, 80, 80]);
    }

    #[test]
    fn test_non_square_frames() {
        #[rustfmt::skip]
        let pixs = vec![
             0,  40, 200,  90, 255,
            17, 250,   3, 128,  64,
            99,   0, 180,  33,  71,
        ];
        let img = GrayImage::from_vec(5, 3, pixs).unwrap();
        let transpose = |img: &GrayImage| GrayImage::from_fn(img.height(), img.width(), |x, y| *img.get_pixel(y, x));

        //the kernel is symmetric, so blurring commutes with transposing
        let blur = Blur::default();
        let act = blur.blur(&img).unwrap();
        let exp = transpose(&blur.blur(&transpose(&img)).unwrap());
        assert_eq!(act, exp);
    }

    #[test]
    fn test_zero_passes_is_identity() {
        let img = GrayImage::from_vec(2, 2, vec![0, 255, 10, 20]).unwrap();
        let act = Blur::from_config(BlurConfig { passes: 0 }).blur(&img).unwrap();
        assert_eq!(act, img);
    }

    #[test]
    fn test_degenerate_frames() {
        let mut blur = Blur::default();
        assert!(blur.process(&GrayImage::new(0, 0)).is_none());
        assert!(blur.process(&GrayImage::new(0, 3)).is_none());
        assert!(blur.process_opt(None).is_none());
    }
}
