use gobees_common::{binarize, regionize_image, region_stats, FrameExt, Mask, RegionStats};
use image::Luma;
use imageproc::contours::BorderType;
use imageproc::definitions::Image;
use serde::{Deserialize, Serialize};

use crate::definitions::{DEFAULT_MAX_AREA, DEFAULT_MIN_AREA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContoursConfig {
    /// Smallest area, in pixels, that is counted. Inclusive.
    pub min_area: u32,
    /// Area, in pixels, from which regions are no longer counted. Exclusive.
    pub max_area: u32,
}

impl ContoursConfig {
    pub fn new(min_area: u32, max_area: u32) -> Self {
        Self { min_area, max_area }
    }

    pub fn accepts(&self, area: u32) -> bool {
        (self.min_area..self.max_area).contains(&area)
    }
}

impl Default for ContoursConfig {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
        }
    }
}

/// A connected foreground region of a mask that was counted as a bee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blob {
    /// Label of the region when the mask is labelled with
    /// [`gobees_common::regionize_image`].
    pub label: u32,
    /// Number of pixels in the region.
    pub area: u32,
    pub centroid: (f64, f64),
    /// (min_x, min_y, max_x, max_y), inclusive.
    pub bounds: (u32, u32, u32, u32),
    /// The outer border of the region, traced clockwise.
    #[serde(skip_serializing)]
    pub contour: Vec<(u32, u32)>,
}

impl Blob {
    fn from_region(stats: &RegionStats) -> Self {
        Self {
            label: stats.label,
            area: stats.area,
            centroid: stats.centroid,
            bounds: stats.bounds,
            contour: vec![],
        }
    }
}

/// Counts the regions of a mask whose area is within the configured range.
///
/// Every call to [`ContoursFinder::process`] starts from scratch, so the count
/// always describes the most recent mask only.
#[derive(Debug, Clone, Default)]
pub struct ContoursFinder {
    cfg: ContoursConfig,
    blobs: Vec<Blob>,
}

impl ContoursFinder {
    pub fn new(min_area: u32, max_area: u32) -> Self {
        Self::from_config(ContoursConfig::new(min_area, max_area))
    }

    pub fn from_config(cfg: ContoursConfig) -> Self {
        Self {
            cfg,
            blobs: vec![],
        }
    }

    pub fn config(&self) -> &ContoursConfig {
        &self.cfg
    }

    /// Find and count the bees in `mask`. Returns the new count.
    pub fn process(&mut self, mask: &Mask) -> usize {
        self.blobs.clear();

        if mask.is_degenerate() {
            debug!(target: "bee_count", "contours: skipping empty mask");
            return 0;
        }

        //every non-zero pixel is foreground. Labelling a mask with several
        //grey levels would otherwise split one region into several.
        let mask = binarize(mask, 0);
        let (labels, num_regions) = regionize_image(&mask);

        let mut blobs = region_stats(&labels)
            .iter()
            .filter(|region| self.cfg.accepts(region.area))
            .map(Blob::from_region)
            .collect::<Vec<_>>();

        attach_contours(&mask, &labels, &mut blobs);

        trace!(
            target: "bee_count",
            "contours: {} regions, {} within {}..{} pixels",
            num_regions,
            blobs.len(),
            self.cfg.min_area,
            self.cfg.max_area
        );

        self.blobs = blobs;
        self.blobs.len()
    }

    /// The number of bees found by the last call to
    /// [`ContoursFinder::process`]. 0 before the first call.
    pub fn num_bees(&self) -> usize {
        self.blobs.len()
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }
}

//give each blob the outer border that starts inside it. Border following
//starts each outer border on a pixel of the region it encloses.
fn attach_contours(mask: &Mask, labels: &Image<Luma<u32>>, blobs: &mut [Blob]) {
    if blobs.is_empty() {
        return;
    }

    for contour in imageproc::contours::find_contours::<u32>(mask) {
        if !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }
        let Some(first) = contour.points.first() else {
            continue;
        };
        let Luma([label]) = *labels.get_pixel(first.x, first.y);

        if let Some(blob) = blobs
            .iter_mut()
            .find(|blob| blob.label == label && blob.contour.is_empty())
        {
            blob.contour = contour.points.iter().map(|p| (p.x, p.y)).collect();
        }
    }
}
