//! # Image Resize Module
//!
//! Calcolo delle dimensioni di destinazione e scelta del filtro di resize.
//!
//! ## Regole
//! - Il lato maggiore viene portato a `max_dimension`, l'altro scala in proporzione
//! - Solo riduzione: un'immagine già nei limiti non viene mai ingrandita
//! - Ogni lato risultante è arrotondato all'intero più vicino e mai inferiore a 1

use clap::ValueEnum;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Algoritmi di resize disponibili
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeAlgorithm {
    /// Lanczos - Migliore qualità per downscaling
    #[default]
    Lanczos,
    /// Catmull-Rom, buona qualità generale
    CatmullRom,
    /// Triangle - Veloce, qualità accettabile
    Triangle,
    /// Nearest neighbour
    Nearest,
}

impl ResizeAlgorithm {
    pub fn to_filter_type(&self) -> FilterType {
        match self {
            ResizeAlgorithm::Lanczos => FilterType::Lanczos3,
            ResizeAlgorithm::CatmullRom => FilterType::CatmullRom,
            ResizeAlgorithm::Triangle => FilterType::Triangle,
            ResizeAlgorithm::Nearest => FilterType::Nearest,
        }
    }
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn larger_side(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn fits_within(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Compute the shrunk dimensions for `current`, or `None` when the image
/// already fits and must be left alone.
pub fn target_dimensions(current: Dimensions, max_dimension: u32) -> Option<Dimensions> {
    if current.fits_within(max_dimension) {
        return None;
    }

    let scale = max_dimension as f64 / current.larger_side() as f64;
    let scaled = |side: u32| -> u32 {
        let value = (side as f64 * scale).round();
        (value as u32).clamp(1, max_dimension)
    };

    Some(Dimensions::new(scaled(current.width), scaled(current.height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_bounds_is_noop() {
        assert_eq!(target_dimensions(Dimensions::new(800, 600), 1200), None);
        assert_eq!(target_dimensions(Dimensions::new(1200, 1200), 1200), None);
        assert_eq!(target_dimensions(Dimensions::new(1, 1), 1), None);
    }

    #[test]
    fn test_landscape_shrinks_to_max_width() {
        let target = target_dimensions(Dimensions::new(4000, 3000), 1200).unwrap();
        assert_eq!(target, Dimensions::new(1200, 900));
    }

    #[test]
    fn test_portrait_shrinks_to_max_height() {
        let target = target_dimensions(Dimensions::new(1000, 2500), 1200).unwrap();
        assert_eq!(target, Dimensions::new(480, 1200));
    }

    #[test]
    fn test_only_one_axis_over_limit() {
        let target = target_dimensions(Dimensions::new(1300, 100), 1200).unwrap();
        assert_eq!(target.width, 1200);
        assert_eq!(target.height, 92);
    }

    #[test]
    fn test_extreme_aspect_clamps_to_one_pixel() {
        let target = target_dimensions(Dimensions::new(10000, 2), 100).unwrap();
        assert_eq!(target, Dimensions::new(100, 1));
    }

    #[test]
    fn test_aspect_ratio_preserved_within_rounding() {
        for (w, h) in [(3001, 1999), (1777, 1333), (5000, 4999), (1201, 7)] {
            let target = target_dimensions(Dimensions::new(w, h), 1200).unwrap();
            assert_eq!(target.larger_side(), 1200);
            let expected_height = h as f64 * target.width as f64 / w as f64;
            assert!((target.height as f64 - expected_height).abs() <= 1.0);
        }
    }

    #[test]
    fn test_filter_mapping() {
        assert_eq!(ResizeAlgorithm::default(), ResizeAlgorithm::Lanczos);
        assert_eq!(ResizeAlgorithm::Nearest.to_filter_type(), FilterType::Nearest);
    }
}
