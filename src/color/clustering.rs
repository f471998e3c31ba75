//! Dominant-color extraction via k-means in Lab space
//!
//! Summarizes a capture raster as a small palette:
//! - Downsamples to a fixed analysis width (bilinear) purely for speed
//! - Clusters pixels in Lab space with bounded iterations and an epsilon
//!   stopping criterion, over several random restarts
//! - Keeps the restart with the lowest compactness
//! - Drops clusters below a minimum area share and sorts the rest descending

use image::{imageops, RgbImage};
use palette::Lab;
use rand::seq::index::sample;
use rand::Rng;

use crate::color::conversion::{delta_e, delta_e_squared, lab_to_rgb, rgb_to_lab};
use crate::constants::analysis;

/// One cluster center and its share of the sampled area
#[derive(Debug, Clone, PartialEq)]
pub struct DominantColorEntry {
    /// Cluster center as displayable RGB
    pub rgb: [u8; 3],
    /// Cluster center in Lab space
    pub lab: Lab,
    /// Share of sampled pixels in percent (0-100)
    pub percentage: f32,
}

/// Dominant-color extractor with tunable clustering parameters
pub struct DominantColorExtractor {
    analysis_width: u32,
    cluster_count: usize,
    max_iterations: usize,
    epsilon: f32,
    restarts: usize,
    min_share_percent: f32,
}

impl Default for DominantColorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DominantColorExtractor {
    /// Create an extractor with the default analysis parameters
    pub fn new() -> Self {
        Self {
            analysis_width: analysis::RESIZE_WIDTH,
            cluster_count: analysis::CLUSTER_COUNT,
            max_iterations: analysis::MAX_ITERATIONS,
            epsilon: analysis::CONVERGENCE_EPSILON,
            restarts: analysis::RESTART_ATTEMPTS,
            min_share_percent: analysis::MIN_SHARE_PERCENT,
        }
    }

    /// Create an extractor with custom parameters
    pub fn with_params(
        analysis_width: u32,
        cluster_count: usize,
        max_iterations: usize,
        epsilon: f32,
        restarts: usize,
        min_share_percent: f32,
    ) -> Self {
        Self {
            analysis_width,
            cluster_count,
            max_iterations,
            epsilon,
            restarts,
            min_share_percent,
        }
    }

    /// Extract the dominant colors of a raster
    ///
    /// # Arguments
    ///
    /// * `raster` - RGB capture raster; analyzed at reduced resolution
    ///
    /// # Returns
    ///
    /// Entries at or above the minimum share, sorted by share descending.
    /// Returns an empty vector when the raster holds fewer pixels than the
    /// cluster count (clustering needs at least k points).
    pub fn extract(&self, raster: &RgbImage) -> Vec<DominantColorEntry> {
        let pixels = self.sample_lab_pixels(raster);
        if pixels.len() < self.cluster_count {
            return Vec::new();
        }

        let mut rng = rand::thread_rng();
        let mut best: Option<(Vec<Lab>, Vec<usize>, f32)> = None;
        for _ in 0..self.restarts {
            let attempt = self.cluster_once(&pixels, &mut rng);
            match &best {
                Some((_, _, compactness)) if attempt.2 >= *compactness => {}
                _ => best = Some(attempt),
            }
        }

        let (centers, counts, _) = match best {
            Some(result) => result,
            None => return Vec::new(),
        };

        let total = pixels.len() as f32;
        let mut entries: Vec<DominantColorEntry> = centers
            .iter()
            .zip(counts.iter())
            .filter_map(|(&lab, &count)| {
                let percentage = count as f32 / total * 100.0;
                (percentage >= self.min_share_percent).then(|| DominantColorEntry {
                    rgb: lab_to_rgb(lab),
                    lab,
                    percentage,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.percentage
                .partial_cmp(&a.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries
    }

    /// Downsample the raster and convert it to Lab pixels
    fn sample_lab_pixels(&self, raster: &RgbImage) -> Vec<Lab> {
        let (w, h) = raster.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }

        let resized;
        let source = if w > self.analysis_width {
            let new_h = ((h as u64 * self.analysis_width as u64) / w as u64).max(1) as u32;
            resized = imageops::resize(
                raster,
                self.analysis_width,
                new_h,
                imageops::FilterType::Triangle,
            );
            &resized
        } else {
            raster
        };

        source.pixels().map(|p| rgb_to_lab(p.0)).collect()
    }

    /// One k-means attempt: random initial centers, bounded Lloyd iterations
    ///
    /// Returns the final centers, per-cluster pixel counts, and compactness
    /// (sum of squared distances of every pixel to its assigned center).
    fn cluster_once(&self, pixels: &[Lab], rng: &mut impl Rng) -> (Vec<Lab>, Vec<usize>, f32) {
        let k = self.cluster_count;
        let mut centers: Vec<Lab> = sample(rng, pixels.len(), k)
            .into_iter()
            .map(|i| pixels[i])
            .collect();

        let mut assignments = vec![0usize; pixels.len()];
        for _ in 0..self.max_iterations {
            for (i, &p) in pixels.iter().enumerate() {
                assignments[i] = nearest_center(&centers, p);
            }

            let mut sums = vec![(0.0f32, 0.0f32, 0.0f32); k];
            let mut counts = vec![0usize; k];
            for (&cluster, &p) in assignments.iter().zip(pixels.iter()) {
                sums[cluster].0 += p.l;
                sums[cluster].1 += p.a;
                sums[cluster].2 += p.b;
                counts[cluster] += 1;
            }

            let mut max_shift = 0.0f32;
            for (i, center) in centers.iter_mut().enumerate() {
                if counts[i] == 0 {
                    // Empty clusters keep their position; they end up with
                    // zero share and are filtered out.
                    continue;
                }
                let n = counts[i] as f32;
                let updated = Lab::new(sums[i].0 / n, sums[i].1 / n, sums[i].2 / n);
                max_shift = max_shift.max(delta_e(*center, updated));
                *center = updated;
            }

            if max_shift <= self.epsilon {
                break;
            }
        }

        let mut counts = vec![0usize; k];
        let mut compactness = 0.0f32;
        for (i, &p) in pixels.iter().enumerate() {
            let cluster = nearest_center(&centers, p);
            assignments[i] = cluster;
            counts[cluster] += 1;
            compactness += delta_e_squared(centers[cluster], p);
        }

        (centers, counts, compactness)
    }
}

/// Index of the center nearest to `p`; ties resolve to the lowest index
fn nearest_center(centers: &[Lab], p: Lab) -> usize {
    centers
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, delta_e_squared(c, p)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
