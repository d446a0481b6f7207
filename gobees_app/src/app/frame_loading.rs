use std::path::{Path, PathBuf};

use gobees_common::FrameExt;
use image::{GrayImage, ImageFormat};
#[cfg(feature = "parallel_loading")]
use rayon::prelude::*;

use crate::app::AppError;

/// Frames are decoded this many at a time, so that a long sequence is never
/// held in memory all at once.
pub const LOAD_BATCH_SIZE: usize = 64;

/// The image files directly inside `dir`, sorted by file name.
pub fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !dir.is_dir() {
        return Err(AppError::FramesDirNotFound(dir.to_path_buf()));
    }

    let mut ret = vec![];
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        //the decoder is chosen by extension, so anything without a known
        //image extension can't be loaded anyway.
        if ImageFormat::from_path(entry.path()).is_err() {
            trace!(target: "frame_load", "Ignoring non-image file {}", entry.path().display());
            continue;
        }

        ret.push(entry.into_path());
    }

    if ret.is_empty() {
        return Err(AppError::NoFrames(dir.to_path_buf()));
    }

    Ok(ret)
}

/// Decode a single frame and convert it to grayscale.
pub fn load_frame(path: &Path) -> Result<GrayImage, AppError> {
    let frame = image::open(path)
        .map_err(|src| AppError::FrameDecodeError {
            path: path.to_path_buf(),
            src,
        })?
        .into_luma8();

    if frame.is_degenerate() {
        debug!(target: "frame_load", "Frame {} has no pixels", path.display());
    }

    Ok(frame)
}

/// Decode a batch of frames. The results are in the same order as `paths`.
pub fn load_batch(paths: &[PathBuf]) -> Vec<Result<GrayImage, AppError>> {
    #[cfg(feature = "parallel_loading")]
    let it = paths.par_iter();

    #[cfg(not(feature = "parallel_loading"))]
    let it = paths.iter();

    it.map(|path| load_frame(path)).collect()
}
