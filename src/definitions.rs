/// The default number of smoothing passes made by [`crate::Blur`]. Each pass
/// is a 3x3 binomial kernel, so two passes behave like a 5x5 kernel.
pub const DEFAULT_BLUR_PASSES: u32 = 2;

/// The default number of frames the background model averages over once it
/// is warm. Higher numbers make the model slower to absorb a bee that stops
/// moving. Lower numbers make it slower to forget the previous scene.
///
/// Unit: Frames
///
/// Reccomended range: 20-500.
pub const DEFAULT_HISTORY: u32 = 50;

/// The default threshold on the squared distance between a pixel and the
/// background, measured in units of the pixel's background variance.
/// Lower numbers flag smaller changes as foreground.
pub const DEFAULT_SENSITIVITY: f64 = 16.0;

/// Radius of the square structuring element used to open the foreground mask.
/// Foreground regions thinner than `2 * radius + 1` pixels are removed.
pub const DEFAULT_OPEN_RADIUS: u8 = 1;

/// Radius of the square structuring element used to close the opened mask.
/// 0 disables closing.
pub const DEFAULT_CLOSE_RADIUS: u8 = 2;

/// Smallest region (in pixels) that is counted as a bee.
pub const DEFAULT_MIN_AREA: u32 = 16;

/// Regions this size or larger are assumed to be several bees, shadows or
/// camera movement and are not counted.
pub const DEFAULT_MAX_AREA: u32 = 600;

//tweakables for the per-pixel variance of the background model. Same scale
//as pixel intensities squared.
pub const VARIANCE_INIT: f32 = 15.0;
pub const VARIANCE_MIN: f32 = 4.0;
pub const VARIANCE_MAX: f32 = 75.0;

//pixels brighter than this are foreground when a frame is forced into a mask
pub const MASK_THRESHOLD: u8 = 127;
