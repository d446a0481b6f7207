#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
#![allow(clippy::doc_markdown)]

//! # Overview
//! `gobees_vision` counts the bees visible in each frame of a video of a hive
//! entrance. Frames are single channel 8 bit images ([`image::GrayImage`]).
//! Each frame is passed through four stages:
//!
//! 1. [`Blur`] smooths out sensor noise.
//! 2. [`BackgroundSubtractor`] keeps a running estimate of the empty scene
//!    and marks the pixels that differ from it as foreground.
//! 3. [`Morphology`] removes foreground specks too small to be a bee.
//! 4. [`ContoursFinder`] labels the remaining regions and counts the ones
//!    whose area is within the expected size of a bee.
//!
//! [`BeesCounter`] chains the four stages together.
//!
//! ```rust
//! use gobees_vision::{BeesCounter, PipelineConfig};
//! use image::{GrayImage, Luma};
//! use imageproc::drawing::draw_filled_circle_mut;
//!
//! let mut counter = BeesCounter::from_config(PipelineConfig::default()).unwrap();
//!
//! // Let the background model learn the empty entrance.
//! let empty = GrayImage::from_pixel(160, 120, Luma([40]));
//! for _ in 0..60 {
//!     assert_eq!(counter.count(&empty), 0);
//! }
//!
//! // A bee walks in.
//! let mut with_bee = empty.clone();
//! draw_filled_circle_mut(&mut with_bee, (80, 60), 8, Luma([220]));
//! assert_eq!(counter.count(&with_bee), 1);
//! ```
//!
//! # Degenerate frames
//! Every stage accepts frames with zero width or height, and absent frames
//! through [`FrameProcessor::process_opt`]. These are not errors: the stage
//! returns `None` and the pipeline reports zero bees for that frame.
//!
//! # Ordering
//! The background model is a time series, so frames must be given to a
//! [`BeesCounter`] in capture order and from a single thread.

#[macro_use]
extern crate log;

mod bees_counter;
mod definitions;
mod frame_processing;

pub use bees_counter::{render_debug, BeesCounter, FrameReport, PipelineConfig, StageFrames};
pub use definitions::{
    DEFAULT_BLUR_PASSES, DEFAULT_CLOSE_RADIUS, DEFAULT_HISTORY, DEFAULT_MAX_AREA,
    DEFAULT_MIN_AREA, DEFAULT_OPEN_RADIUS, DEFAULT_SENSITIVITY,
};
pub use frame_processing::{
    background_subtractor::{BackgroundConfig, BackgroundSubtractor},
    blur::{Blur, BlurConfig},
    contours_finder::{Blob, ContoursConfig, ContoursFinder},
    morphology::{Morphology, MorphologyConfig},
    Error, FrameProcessor,
};

pub use gobees_common::Mask;

type VisionResult<T> = Result<T, crate::Error>;
