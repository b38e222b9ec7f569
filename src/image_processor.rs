//! # Image Processing Module
//!
//! Questo modulo esegue la pipeline completa su un singolo asset usando il
//! crate `image` come codec (decode/encode JPEG e PNG, resize).
//!
//! ## Pipeline di Ottimizzazione
//!
//! 1. **Precondizione**: il candidato deve essere un file regolare leggibile
//!    (i symlink non contano), altrimenti viene saltato in silenzio
//! 2. **Probe**: dimensioni dall'header, corrette per l'orientamento EXIF
//! 3. **No-op**: se entrambi i lati sono entro `max_dimension` il file non
//!    viene toccato
//! 4. **Resize**: pixel raddrizzati, lato maggiore portato a `max_dimension`,
//!    aspect ratio preservato
//! 5. **Encode**: JPEG alla qualità configurata, PNG con compressione massima
//! 6. **Replace**: temp file nella stessa directory + rename atomico
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output | Note |
//! |---------|-------|--------|------|
//! | JPEG    | ✅    | ✅     | qualità 1-100, alpha e 16 bit appiattiti a RGB8 |
//! | PNG     | ✅    | ✅     | lossless, `CompressionType::Best` |
//! | Altri   | ❌    | ❌     | `decode-error` |
//!
//! Il formato di output è sempre quello rilevato dal contenuto del file, non
//! dall'estensione.
//!
//! ## Esempio
//!
//! ```ignore
//! let processor = ImageProcessor::new(Config::default());
//! if let Some(outcome) = processor.process(&Candidate::new(path)) {
//!     println!("{:?}", outcome.status);
//! }
//! ```

use crate::config::Config;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::orientation::Orientation;
use crate::outcome::{Asset, AssetOutcome, Candidate};
use crate::resize::{target_dimensions, Dimensions};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageFormat};
use std::fs::File;
use std::io::{Cursor, Read};
use tracing::{debug, error, info};

/// Per-asset resize and recompression pipeline
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    /// Transform policy and run options
    config: Config,
}

impl ImageProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the whole pipeline on `path`.
    ///
    /// Returns `None` when the candidate is not a regular, readable file.
    /// Every other problem is folded into a failed [`AssetOutcome`], so one
    /// bad image never aborts the batch.
    ///
    /// This is blocking, CPU-bound work; async callers should run it on
    /// `spawn_blocking`.
    pub fn process(&self, candidate: &Candidate) -> Option<AssetOutcome> {
        let path = candidate.path.as_path();
        let (asset, file) = match Self::open_candidate(candidate) {
            Some(opened) => opened,
            None => {
                debug!("Skipping {}: not a regular readable file", path.display());
                return None;
            }
        };

        match self.optimize_asset(&asset, file) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Failed to optimize {}: {}", path.display(), e);
                Some(AssetOutcome::failed(path, asset.discovered_at, &e))
            }
        }
    }

    /// Open a candidate if it is a regular file we can read. Symlinks are
    /// not followed: renaming over one would replace the link, not its target.
    fn open_candidate(candidate: &Candidate) -> Option<(Asset, File)> {
        let path = candidate.path.as_path();
        let metadata = std::fs::symlink_metadata(path).ok()?;
        if !metadata.file_type().is_file() {
            return None;
        }

        let file = File::open(path).ok()?;
        let asset = Asset::new(path.to_path_buf(), metadata.len(), candidate.discovered_at);
        Some((asset, file))
    }

    fn optimize_asset(&self, asset: &Asset, mut file: File) -> Result<AssetOutcome, OptimizeError> {
        let mut bytes = Vec::with_capacity(asset.original_size as usize);
        file.read_to_end(&mut bytes)?;
        drop(file);
        let bytes = bytes.as_slice();

        let format = Self::detect_format(bytes)?;
        let orientation = Orientation::read(bytes);
        let current = orientation.oriented(Self::probe_dimensions(bytes, format)?);

        let target = match target_dimensions(current, self.config.max_dimension) {
            Some(target) => target,
            None => {
                debug!(
                    "{} is {} (within {}px), leaving untouched",
                    asset.path.display(),
                    current,
                    self.config.max_dimension
                );
                return Ok(AssetOutcome::no_op(asset));
            }
        };

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| OptimizeError::Decode(e.to_string()))?;
        if orientation != Orientation::Normal {
            debug!("Applying EXIF orientation {:?} to {}", orientation, asset.path.display());
        }
        let resized = orientation.apply(decoded).resize_exact(
            target.width,
            target.height,
            self.config.filter.to_filter_type(),
        );
        let encoded = self.encode(&resized, format)?;

        if self.config.dry_run {
            debug!("Dry run: would replace {}", asset.path.display());
        } else {
            let staged = FileManager::stage_replacement(&asset.path, &encoded)?;
            FileManager::commit_replacement(staged, &asset.path)?;
        }

        info!(
            "Resized {} {} -> {} ({} -> {})",
            asset.path.display(),
            current,
            target,
            FileManager::format_size(asset.original_size),
            FileManager::format_size(encoded.len() as u64)
        );

        Ok(AssetOutcome::optimized(
            asset,
            encoded.len() as u64,
            current,
            target,
        ))
    }

    /// Identify the codec from the file contents; only JPEG and PNG are handled.
    fn detect_format(bytes: &[u8]) -> Result<ImageFormat, OptimizeError> {
        let format = image::guess_format(bytes)
            .map_err(|e| OptimizeError::Decode(format!("unrecognized image data: {}", e)))?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png => Ok(format),
            other => Err(OptimizeError::Decode(format!(
                "unsupported image format {:?}",
                other
            ))),
        }
    }

    fn probe_dimensions(bytes: &[u8], format: ImageFormat) -> Result<Dimensions, OptimizeError> {
        let (width, height) = image::io::Reader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(|e| OptimizeError::Decode(e.to_string()))?;
        Ok(Dimensions::new(width, height))
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, OptimizeError> {
        let mut buffer = Vec::new();
        let to_encode_error = |e: image::ImageError| OptimizeError::Encode(e.to_string());

        match format {
            ImageFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.config.quality);
                match image {
                    DynamicImage::ImageLuma8(gray) => encoder
                        .encode(gray.as_raw(), gray.width(), gray.height(), ColorType::L8)
                        .map_err(to_encode_error)?,
                    _ => {
                        // JPEG has no alpha and no 16-bit samples.
                        let rgb = image.to_rgb8();
                        encoder
                            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                            .map_err(to_encode_error)?
                    }
                }
            }
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                encoder
                    .write_image(image.as_bytes(), image.width(), image.height(), image.color())
                    .map_err(to_encode_error)?;
            }
            other => {
                return Err(OptimizeError::Encode(format!(
                    "cannot encode {:?}",
                    other
                )))
            }
        }

        Ok(buffer)
    }
}
