//! # Orientation Module
//!
//! Lettura del tag EXIF Orientation (274) e raddrizzamento dei pixel.
//!
//! ## Responsabilità:
//! - Legge l'orientamento dai metadati EXIF con `kamadak-exif`
//! - Calcola le dimensioni "come visualizzate" su cui si misura il limite
//! - Applica rotazione/specchiatura prima del resize
//!
//! Il re-encode non conserva i metadati EXIF, quindi i pixel vengono scritti
//! già orientati: l'immagine ottimizzata si visualizza come l'originale.

use crate::resize::Dimensions;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// EXIF orientation values 1-8
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Mirrored across the main diagonal
    Transpose,
    /// Stored rotated; display needs 90° clockwise
    Rotate90,
    /// Mirrored across the anti-diagonal
    Transverse,
    /// Stored rotated; display needs 270° clockwise
    Rotate270,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    /// Orientation recorded in `bytes`, `Normal` when absent or unreadable.
    pub fn read(bytes: &[u8]) -> Self {
        let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(_) => return Orientation::Normal,
        };

        let value = exif
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0));

        match value.and_then(Self::from_exif) {
            Some(orientation) => orientation,
            None => {
                if let Some(raw) = value {
                    debug!("Ignoring invalid EXIF orientation {}", raw);
                }
                Orientation::Normal
            }
        }
    }

    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Dimensions as displayed, given the stored ones
    pub fn oriented(&self, stored: Dimensions) -> Dimensions {
        if self.swaps_axes() {
            Dimensions::new(stored.height, stored.width)
        } else {
            stored
        }
    }

    /// Rewrite the pixels so the image displays upright without the tag
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => image,
            Orientation::FlipHorizontal => image.fliph(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::FlipVertical => image.flipv(),
            Orientation::Transpose => image.rotate90().fliph(),
            Orientation::Rotate90 => image.rotate90(),
            Orientation::Transverse => image.rotate270().fliph(),
            Orientation::Rotate270 => image.rotate270(),
        }
    }
}
