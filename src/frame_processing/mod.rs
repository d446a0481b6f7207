pub mod background_subtractor;
pub mod blur;
pub mod contours_finder;
pub mod morphology;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A pipeline stage that turns one frame into another, or declines to.
///
/// Stages return `None` instead of failing when there is nothing to process
/// (a frame with no pixels). Callers chain stages with `?` and treat `None` as
/// "nothing detected in this frame".
pub trait FrameProcessor {
    fn process(&mut self, frame: &GrayImage) -> Option<GrayImage>;

    /// As [`FrameProcessor::process`], for callers whose frame may be absent.
    /// An absent frame is never seen by the stage.
    fn process_opt(&mut self, frame: Option<&GrayImage>) -> Option<GrayImage> {
        frame.and_then(|frame| self.process(frame))
    }
}

/// An error that prevented a pipeline from being built.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
