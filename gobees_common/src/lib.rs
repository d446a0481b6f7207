#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

pub mod compositing;
pub mod frame;
pub mod regions;

pub use compositing::{gray_to_rgb, row_images_rgb};
pub use frame::{binarize, FrameExt, Mask, MASK_BACKGROUND, MASK_FOREGROUND};
pub use regions::{colourize_regions, regionize_image, region_stats, RegionStats};
