use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::definitions::Image;

/// Label the 8-connected foreground regions of a mask. Label 0 is
/// background, regions are numbered from 1 in scan order.
///
/// Returns the label image and the number of regions found.
pub fn regionize_image(img: &GrayImage) -> (Image<Luma<u32>>, usize) {
    use imageproc::region_labelling::Connectivity::Eight;
    let fg = imageproc::region_labelling::connected_components(img, Eight, Luma([0]));

    let num_regions = fg.pixels().map(|Luma([label])| *label).max().unwrap_or(0) as usize;

    (fg, num_regions)
}

/// Summary of a single labelled region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub label: u32,
    pub area: u32,
    pub centroid: (f64, f64),
    /// (min_x, min_y, max_x, max_y), inclusive.
    pub bounds: (u32, u32, u32, u32),
}

#[derive(Clone, Copy)]
struct RegionAcc {
    area: u64,
    sum_x: u64,
    sum_y: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Default for RegionAcc {
    fn default() -> Self {
        Self {
            area: 0,
            sum_x: 0,
            sum_y: 0,
            min_x: u32::MAX,
            min_y: u32::MAX,
            max_x: 0,
            max_y: 0,
        }
    }
}

/// Measure every region of a label image in a single pass. The result is
/// ordered by label.
pub fn region_stats(regions: &Image<Luma<u32>>) -> Vec<RegionStats> {
    let mut acc: Vec<RegionAcc> = vec![];
    for (x, y, Luma([label])) in regions.enumerate_pixels() {
        if *label == 0 {
            continue;
        }
        let idx = *label as usize;
        acc.resize_with((idx + 1).max(acc.len()), RegionAcc::default);

        let region = &mut acc[idx];
        region.area += 1;
        region.sum_x += u64::from(x);
        region.sum_y += u64::from(y);
        region.min_x = region.min_x.min(x);
        region.min_y = region.min_y.min(y);
        region.max_x = region.max_x.max(x);
        region.max_y = region.max_y.max(y);
    }

    acc.iter()
        .enumerate()
        .filter(|(_label, region)| region.area > 0)
        .map(|(label, region)| {
            let area = region.area as f64;
            RegionStats {
                label: label as u32,
                area: region.area as u32,
                centroid: (region.sum_x as f64 / area, region.sum_y as f64 / area),
                bounds: (region.min_x, region.min_y, region.max_x, region.max_y),
            }
        })
        .collect()
}

/// Paint each listed region in its own colour. Unlisted regions and
/// background stay black.
pub fn colourize_regions(img: &Image<Luma<u32>>, keep: &[u32]) -> RgbImage {
    let colours = [
        Rgb::<u8>([255, 200, 0]),
        Rgb::<u8>([0, 200, 255]),
        Rgb::<u8>([255, 0, 255]),
        Rgb::<u8>([0, 255, 0]),
        Rgb::<u8>([255, 64, 64]),
        Rgb::<u8>([128, 128, 255]),
        Rgb::<u8>([255, 255, 255]),
    ];

    let mut ret = RgbImage::new(img.width(), img.height());

    for (Luma([region_pix]), ret_pix) in img.pixels().zip(ret.pixels_mut()) {
        if *region_pix != 0 && keep.contains(region_pix) {
            *ret_pix = colours[*region_pix as usize % colours.len()];
        }
    }

    ret
}
