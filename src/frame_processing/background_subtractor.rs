use gobees_common::{FrameExt, Mask, MASK_BACKGROUND, MASK_FOREGROUND};
use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use serde::{Deserialize, Serialize};

use crate::definitions::{
    DEFAULT_HISTORY, DEFAULT_SENSITIVITY, VARIANCE_INIT, VARIANCE_MAX, VARIANCE_MIN,
};
use crate::frame_processing::FrameProcessor;

type GrayImageF32 = Image<Luma<f32>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Number of frames after which the model stops speeding up its learning
    /// rate and settles at `1 / history`.
    pub history: u32,

    /// Squared deviation from the background mean, in units of the
    /// background variance, above which a pixel is foreground.
    pub sensitivity: f64,
}

impl BackgroundConfig {
    pub fn new(history: u32, sensitivity: f64) -> Self {
        Self {
            history,
            sensitivity,
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

//running per-pixel statistics. Only exists once a first frame has been seen.
#[derive(Debug, Clone)]
struct BackgroundEstimate {
    mean: GrayImageF32,
    variance: GrayImageF32,
    frames_seen: u32,
}

impl BackgroundEstimate {
    fn new(first_frame: &GrayImage) -> Self {
        let (width, height) = first_frame.dimensions();

        let mut mean = GrayImageF32::new(width, height);
        for (&Luma([src_pix]), Luma([mean_pix])) in first_frame.pixels().zip(mean.pixels_mut()) {
            *mean_pix = f32::from(src_pix);
        }

        Self {
            mean,
            variance: GrayImageF32::from_pixel(width, height, Luma([VARIANCE_INIT])),
            frames_seen: 1,
        }
    }

    //classify every pixel of the frame against the current estimate, then fold
    //the frame into the estimate.
    fn update(&mut self, frame: &GrayImage, cfg: &BackgroundConfig) -> Mask {
        let history = cfg.history.max(1);
        let alpha = 1.0 / self.frames_seen.saturating_add(1).min(history) as f32;
        let sensitivity = cfg.sensitivity as f32;

        let mut ret = Mask::new(frame.width(), frame.height());

        for (((&Luma([src_pix]), Luma([mean_pix])), Luma([var_pix])), Luma([ret_pix])) in frame
            .pixels()
            .zip(self.mean.pixels_mut())
            .zip(self.variance.pixels_mut())
            .zip(ret.pixels_mut())
        {
            let diff = f32::from(src_pix) - *mean_pix;
            let dist_sq = diff * diff;

            *ret_pix = if dist_sq > sensitivity * *var_pix {
                MASK_FOREGROUND
            } else {
                MASK_BACKGROUND
            };

            *mean_pix += alpha * diff;
            *var_pix += alpha * (dist_sq - *var_pix);
            *var_pix = var_pix.clamp(VARIANCE_MIN, VARIANCE_MAX);
        }

        self.frames_seen = self.frames_seen.saturating_add(1);
        ret
    }
}

/// Maintains a running estimate of the empty scene and marks the pixels of
/// each new frame that do not fit it.
///
/// Each pixel is modelled as a single gaussian. For the first `history`
/// frames the learning rate is `1 / frames_seen`, so the mean is the plain
/// average of everything seen so far. After that the learning rate stays at
/// `1 / history`, so the model slowly forgets old frames and absorbs anything
/// that stops moving.
///
/// A pixel is foreground when `(pixel - mean)^2 > sensitivity * variance`.
#[derive(Debug, Clone, Default)]
pub struct BackgroundSubtractor {
    cfg: BackgroundConfig,
    estimate: Option<BackgroundEstimate>,
}

impl BackgroundSubtractor {
    pub fn new(history: u32, sensitivity: f64) -> Self {
        Self::from_config(BackgroundConfig::new(history, sensitivity))
    }

    pub fn from_config(cfg: BackgroundConfig) -> Self {
        Self {
            cfg,
            estimate: None,
        }
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.cfg
    }

    /// Number of frames folded into the background estimate.
    pub fn frames_seen(&self) -> u32 {
        self.estimate.as_ref().map_or(0, |est| est.frames_seen)
    }

    /// True once the learning rate has settled at `1 / history`.
    pub fn is_warm(&self) -> bool {
        self.frames_seen() >= self.cfg.history
    }

    /// The current background mean, rounded to 8 bits.
    pub fn background(&self) -> Option<GrayImage> {
        let est = self.estimate.as_ref()?;
        let mut ret = GrayImage::new(est.mean.width(), est.mean.height());
        for (Luma([mean_pix]), Luma([ret_pix])) in est.mean.pixels().zip(ret.pixels_mut()) {
            *ret_pix = mean_pix.round().clamp(0.0, 255.0) as u8;
        }
        Some(ret)
    }

    /// Classify the pixels of `frame` as foreground (255) or background (0),
    /// then learn from it.
    #[must_use]
    pub fn apply(&mut self, frame: &GrayImage) -> Option<Mask> {
        if frame.is_degenerate() {
            debug!(target: "bee_count", "background: skipping empty frame");
            return None;
        }

        let est = match self.estimate.as_mut() {
            Some(est) if est.mean.dimensions() == frame.dimensions() => est,
            Some(est) => {
                warn!(
                    "frame size changed from {:?} to {:?}. Relearning background",
                    est.mean.dimensions(),
                    frame.dimensions()
                );
                return Some(self.restart(frame));
            }
            None => return Some(self.restart(frame)),
        };

        let ret = est.update(frame, &self.cfg);

        trace!(
            target: "bee_count",
            "background: frame {}, warm: {}",
            est.frames_seen,
            est.frames_seen >= self.cfg.history
        );

        Some(ret)
    }

    //the first frame of a scene is the background, so nothing in it is foreground.
    fn restart(&mut self, frame: &GrayImage) -> Mask {
        self.estimate = Some(BackgroundEstimate::new(frame));
        Mask::new(frame.width(), frame.height())
    }
}

impl FrameProcessor for BackgroundSubtractor {
    fn process(&mut self, frame: &GrayImage) -> Option<GrayImage> {
        self.apply(frame)
    }
}
