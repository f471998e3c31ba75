//! Color space math and dominant-color clustering

pub mod clustering;
pub mod conversion;

pub use clustering::{DominantColorEntry, DominantColorExtractor};
pub use conversion::{
    delta_e, delta_e_squared, lab_to_rgb, parse_rgb_triple, readable_text_color, rgb_to_hex,
    rgb_to_lab, rgb_within_tolerance,
};
