use gobees_common::{
    binarize, colourize_regions, gray_to_rgb, regionize_image, row_images_rgb, Mask,
};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::frame_processing::{
    background_subtractor::{BackgroundConfig, BackgroundSubtractor},
    blur::{Blur, BlurConfig},
    contours_finder::{Blob, ContoursConfig, ContoursFinder},
    morphology::{Morphology, MorphologyConfig},
};
use crate::{Error, VisionResult};

//gap between the panels of a debug image
const DEBUG_PANEL_GAP: u32 = 4;
const DEBUG_BOX_COLOUR: Rgb<u8> = Rgb([255, 32, 32]);

/// Settings for every stage of a [`BeesCounter`]. Missing fields take their
/// default value when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub blur: BlurConfig,
    pub background: BackgroundConfig,
    pub morphology: MorphologyConfig,
    pub contours: ContoursConfig,
}

impl PipelineConfig {
    /// Check that the settings can produce a meaningful count.
    pub fn validate(&self) -> VisionResult<()> {
        if self.blur.passes == 0 {
            return Err(Error::InvalidConfig(
                "blur.passes must be at least 1".to_string(),
            ));
        }

        if self.background.history == 0 {
            return Err(Error::InvalidConfig(
                "background.history must be at least 1".to_string(),
            ));
        }

        let sensitivity = self.background.sensitivity;
        if !sensitivity.is_finite() || sensitivity < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "background.sensitivity must be a non-negative number, got {sensitivity}"
            )));
        }

        let ContoursConfig { min_area, max_area } = self.contours;
        if min_area >= max_area {
            return Err(Error::InvalidConfig(format!(
                "contours.min_area ({min_area}) must be less than contours.max_area ({max_area})"
            )));
        }

        Ok(())
    }
}

/// The result of counting the bees in one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Position of the frame in the sequence given to the counter, from 0.
    pub frame_index: u64,
    pub num_bees: usize,
    pub blobs: Vec<Blob>,
}

/// The intermediate images of one frame, for inspecting how a count came about.
#[derive(Debug, Clone)]
pub struct StageFrames {
    pub blurred: GrayImage,
    pub foreground: Mask,
    pub cleaned: Mask,
}

/// Runs every frame of a sequence through [`Blur`], [`BackgroundSubtractor`],
/// [`Morphology`] and [`ContoursFinder`] in turn.
///
/// Frames must be given in capture order. A frame that a stage declines
/// (one with no pixels) counts as zero bees and does not affect the
/// background model.
#[derive(Debug, Clone)]
pub struct BeesCounter {
    cfg: PipelineConfig,
    blur: Blur,
    bs: BackgroundSubtractor,
    morf: Morphology,
    cf: ContoursFinder,
    frames_processed: u64,
}

impl BeesCounter {
    pub fn from_config(cfg: PipelineConfig) -> VisionResult<Self> {
        cfg.validate()?;

        Ok(Self {
            cfg,
            blur: Blur::from_config(cfg.blur),
            bs: BackgroundSubtractor::from_config(cfg.background),
            morf: Morphology::from_config(cfg.morphology),
            cf: ContoursFinder::from_config(cfg.contours),
            frames_processed: 0,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Number of frames given to the counter so far, including frames that
    /// were declined.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// The background model's current estimate of the empty scene.
    pub fn background(&self) -> Option<GrayImage> {
        self.bs.background()
    }

    /// Count the bees in the next frame of the sequence.
    pub fn count(&mut self, frame: &GrayImage) -> usize {
        self.process(frame).num_bees
    }

    pub fn process(&mut self, frame: &GrayImage) -> FrameReport {
        let (report, _stages) = self.process_inner(frame, false);
        report
    }

    /// As [`BeesCounter::process`], also returning the intermediate images.
    /// These are `None` when the frame was declined by a stage.
    pub fn process_debug(&mut self, frame: &GrayImage) -> (FrameReport, Option<StageFrames>) {
        self.process_inner(frame, true)
    }

    fn process_inner(
        &mut self,
        frame: &GrayImage,
        keep_stages: bool,
    ) -> (FrameReport, Option<StageFrames>) {
        let frame_index = self.frames_processed;
        self.frames_processed += 1;

        let Some(stages) = self.run_stages(frame) else {
            debug!(target: "bee_count", "frame {frame_index}: declined, 0 bees");
            let report = FrameReport {
                frame_index,
                num_bees: 0,
                blobs: vec![],
            };
            return (report, None);
        };

        let num_bees = self.cf.process(&stages.cleaned);
        let report = FrameReport {
            frame_index,
            num_bees,
            blobs: self.cf.blobs().to_vec(),
        };

        debug!(target: "bee_count", "frame {frame_index}: {num_bees} bees");

        (report, keep_stages.then_some(stages))
    }

    fn run_stages(&mut self, frame: &GrayImage) -> Option<StageFrames> {
        let blurred = self.blur.blur(frame)?;
        let foreground = self.bs.apply(&blurred)?;
        let cleaned = self.morf.clean(&foreground)?;

        Some(StageFrames {
            blurred,
            foreground,
            cleaned,
        })
    }
}

/// Draw a frame next to its foreground mask, its cleaned mask and the blobs
/// that were counted, in a single row. Counted blobs are boxed on the input
/// frame and painted in their own colour on the last panel.
///
/// Returns None if the frame is a different size to the intermediate images.
#[must_use]
pub fn render_debug(frame: &GrayImage, stages: &StageFrames, blobs: &[Blob]) -> Option<RgbImage> {
    let dims = frame.dimensions();
    if [&stages.foreground, &stages.cleaned]
        .iter()
        .any(|stage| stage.dimensions() != dims)
    {
        return None;
    }

    let mut annotated = gray_to_rgb(frame);
    for blob in blobs {
        let (min_x, min_y, max_x, max_y) = blob.bounds;
        let rect = Rect::at(min_x as i32, min_y as i32).of_size(max_x - min_x + 1, max_y - min_y + 1);
        draw_hollow_rect_mut(&mut annotated, rect, DEBUG_BOX_COLOUR);
    }

    //labelling the cleaned mask the same way as ContoursFinder gives the
    //same labels the blobs were found with.
    let (labels, _num_regions) = regionize_image(&binarize(&stages.cleaned, 0));
    let counted = blobs.iter().map(|blob| blob.label).collect_vec();
    let coloured = colourize_regions(&labels, &counted);

    let panels = [
        annotated,
        gray_to_rgb(&stages.foreground),
        gray_to_rgb(&stages.cleaned),
        coloured,
    ];

    row_images_rgb(&panels, DEBUG_PANEL_GAP)
}

#[cfg(test)]
mod test {
    use gobees_common::FrameExt;
    use image::{GrayImage, Luma, Rgb};
    use imageproc::drawing::draw_filled_circle_mut;

    use super::*;

    fn warmed_up_counter(empty: &GrayImage) -> BeesCounter {
        let mut counter = BeesCounter::from_config(PipelineConfig::default()).unwrap();
        for _ in 0..60 {
            assert_eq!(counter.count(empty), 0);
        }
        counter
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.background.history = 0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));

        let mut cfg = PipelineConfig::default();
        cfg.background.sensitivity = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.background.sensitivity = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.blur.passes = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.contours = ContoursConfig::new(600, 600);
        assert!(BeesCounter::from_config(cfg).is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"contours": {"min_area": 30}, "background": {"history": 20}}"#)
                .unwrap();

        assert_eq!(cfg.contours.min_area, 30);
        assert_eq!(cfg.contours.max_area, crate::DEFAULT_MAX_AREA);
        assert_eq!(cfg.background.history, 20);
        assert_eq!(cfg.background.sensitivity, crate::DEFAULT_SENSITIVITY);
        assert_eq!(cfg.blur, BlurConfig::default());
    }

    #[test]
    fn test_counts_bees_entering_and_leaving() {
        let empty = GrayImage::from_pixel(160, 120, Luma([40]));
        let mut counter = warmed_up_counter(&empty);

        let mut two_bees = empty.clone();
        draw_filled_circle_mut(&mut two_bees, (40, 60), 8, Luma([220]));
        draw_filled_circle_mut(&mut two_bees, (120, 60), 8, Luma([220]));

        let report = counter.process(&two_bees);
        assert_eq!(report.frame_index, 60);
        assert_eq!(report.num_bees, 2);
        assert_eq!(report.blobs.len(), 2);

        let (cx, cy) = report.blobs[0].centroid;
        assert!((cx - 40.0).abs() < 1.0 && (cy - 60.0).abs() < 1.0);

        assert_eq!(counter.count(&empty), 0);
    }

    #[test]
    fn test_degenerate_frame_counts_zero() {
        let empty = GrayImage::from_pixel(64, 64, Luma([40]));
        let mut counter = warmed_up_counter(&empty);
        let frames_seen = counter.bs.frames_seen();

        let (report, stages) = counter.process_debug(&GrayImage::new(0, 0));
        assert_eq!(report.num_bees, 0);
        assert_eq!(report.frame_index, 60);
        assert!(stages.is_none());

        assert_eq!(counter.frames_processed(), 61);
        assert_eq!(counter.bs.frames_seen(), frames_seen);
    }

    #[test]
    fn test_process_debug_and_render() {
        let empty = GrayImage::from_pixel(80, 60, Luma([40]));
        let mut counter = warmed_up_counter(&empty);

        let mut one_bee = empty.clone();
        draw_filled_circle_mut(&mut one_bee, (40, 30), 7, Luma([220]));

        let (report, stages) = counter.process_debug(&one_bee);
        let stages = stages.unwrap();
        assert_eq!(report.num_bees, 1);
        assert!(stages.foreground.is_binary());
        assert!(stages.cleaned.is_binary());
        assert!(!stages.cleaned.is_all_background());

        let img = render_debug(&one_bee, &stages, &report.blobs).unwrap();
        assert_eq!(img.dimensions(), (4 * 80 + 3 * DEBUG_PANEL_GAP, 60));

        //centre of the bee in the last panel is coloured in
        let last_panel_x = 3 * (80 + DEBUG_PANEL_GAP);
        assert_ne!(img.get_pixel(last_panel_x + 40, 30), &Rgb([0, 0, 0]));

        let (min_x, min_y, _max_x, _max_y) = report.blobs[0].bounds;
        assert_eq!(img.get_pixel(min_x, min_y), &DEBUG_BOX_COLOUR);
    }

    #[test]
    fn test_render_colours_grey_level_blobs() {
        let mut cleaned = GrayImage::new(20, 20);
        imageproc::drawing::draw_filled_rect_mut(
            &mut cleaned,
            Rect::at(4, 4).of_size(5, 8),
            Luma([120]),
        );
        imageproc::drawing::draw_filled_rect_mut(
            &mut cleaned,
            Rect::at(9, 4).of_size(5, 8),
            Luma([255]),
        );

        let mut cf = ContoursFinder::new(16, 600);
        assert_eq!(cf.process(&cleaned), 1);

        let stages = StageFrames {
            blurred: cleaned.clone(),
            foreground: cleaned.clone(),
            cleaned: cleaned.clone(),
        };
        let img = render_debug(&cleaned, &stages, cf.blobs()).unwrap();

        //both grey levels of the blob are painted in the last panel
        let last_panel_x = 3 * (20 + DEBUG_PANEL_GAP);
        assert_ne!(img.get_pixel(last_panel_x + 5, 6), &Rgb([0, 0, 0]));
        assert_ne!(img.get_pixel(last_panel_x + 12, 6), &Rgb([0, 0, 0]));
        assert_eq!(
            img.get_pixel(last_panel_x + 5, 6),
            img.get_pixel(last_panel_x + 12, 6)
        );
    }

    #[test]
    fn test_render_rejects_mismatched_frame() {
        let stages = StageFrames {
            blurred: GrayImage::new(10, 10),
            foreground: GrayImage::new(10, 10),
            cleaned: GrayImage::new(10, 10),
        };
        assert!(render_debug(&GrayImage::new(5, 5), &stages, &[]).is_none());
    }
}
