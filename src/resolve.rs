//! Turning a queued image plus the global selections into final settings.
//!
//! [`SettingsResolver`] is built from an [`ImportConfig`]. Building it maps
//! every persisted selection index back to its catalog entry, so a corrupt
//! config is reported before any image is confirmed.
//!
//! [`ResolvedSettings`] is what the renderer receives. It is immutable and may
//! be read from any thread. The one piece that depends on the image's pixel
//! size, the resampler, is a [`DeferredResampler`]: nothing is probed until
//! the renderer asks, and the answer is computed at most once.

use crate::config::{ConfigError, ImportConfig};
use crate::imaging::{BackendError, Dimensions};
use crate::options::{
    AlgorithmOption, BackgroundOption, ColorAlgorithm, DiffusionKernel, DitherOption,
    ResizeMode, Resampler, ScalingOption, StretchOption,
};
use crate::queue::QueuedImage;
use crate::source::PendingSource;
use crate::transform::TransformState;
use image::Rgba;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("could not read size of {path}: {source}")]
    SizeLookup {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Dithering and palette matching, bundled for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessPolicy {
    /// `None` maps each pixel to its nearest palette color without diffusion.
    pub dither: Option<&'static DiffusionKernel>,
    pub algorithm: ColorAlgorithm,
}

/// A resampler choice that waits for the image's final size.
///
/// Holds the source and the scaling policy rather than a closure, plus a
/// memo cell for the result. Only success is memoized. Clones share the memo
/// cell, so a batch handed to several consumers still probes once.
#[derive(Clone)]
pub struct DeferredResampler {
    source: Arc<PendingSource>,
    policy: ScalingOption,
    resolved: Arc<OnceCell<Resampler>>,
}

impl DeferredResampler {
    pub fn new(source: Arc<PendingSource>, policy: ScalingOption) -> Self {
        Self {
            source,
            policy,
            resolved: Arc::new(OnceCell::new()),
        }
    }

    pub fn policy(&self) -> ScalingOption {
        self.policy
    }

    /// Compute (once) and return the resampler.
    pub fn evaluate(&self) -> Result<Resampler, ResolveError> {
        self.resolved
            .get_or_try_init(|| {
                let size = self.source.size().map_err(|source| {
                    let path = self.source.path();
                    log::warn!("size lookup failed for {}: {}", path.display(), source);
                    ResolveError::SizeLookup {
                        path: self.source.path().to_path_buf(),
                        source,
                    }
                })?;
                Ok(self.policy.resampler_for(size))
            })
            .copied()
    }

    /// The resampler if it has already been evaluated.
    pub fn get(&self) -> Option<Resampler> {
        self.resolved.get().copied()
    }
}

impl std::fmt::Debug for DeferredResampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredResampler")
            .field("policy", &self.policy)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

/// Finalized conversion settings for one confirmed image.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    source: Arc<PendingSource>,
    transform: TransformState,
    grid_width: u32,
    grid_height: u32,
    resampler: DeferredResampler,
    resize_mode: ResizeMode,
    background: Rgba<u8>,
    process: ProcessPolicy,
}

impl ResolvedSettings {
    pub fn source(&self) -> &PendingSource {
        &self.source
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    /// Evaluate the deferred resampler.
    pub fn resampler(&self) -> Result<Resampler, ResolveError> {
        self.resampler.evaluate()
    }

    pub fn deferred_resampler(&self) -> &DeferredResampler {
        &self.resampler
    }

    pub fn resize_mode(&self) -> ResizeMode {
        self.resize_mode
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn process(&self) -> ProcessPolicy {
        self.process
    }

    /// Native size of the source, probing if needed.
    pub fn source_size(&self) -> Result<Dimensions, ResolveError> {
        self.source
            .size()
            .map_err(|source| ResolveError::SizeLookup {
                path: self.source.path().to_path_buf(),
                source,
            })
    }
}

/// Snapshot of the global selections, validated once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsResolver {
    grid_width: u32,
    grid_height: u32,
    stretch: StretchOption,
    scale: ScalingOption,
    dither: DitherOption,
    algorithm: AlgorithmOption,
    background: BackgroundOption,
}

impl SettingsResolver {
    /// Refuses to build if any selection index is out of range.
    pub fn from_config(config: &ImportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sel = &config.selections;
        Ok(Self {
            grid_width: config.grid.width,
            grid_height: config.grid.height,
            stretch: sel.get()?,
            scale: sel.get()?,
            dither: sel.get()?,
            algorithm: sel.get()?,
            background: sel.get()?,
        })
    }

    pub fn scale(&self) -> ScalingOption {
        self.scale
    }

    pub fn resolve(&self, image: &QueuedImage) -> ResolvedSettings {
        ResolvedSettings {
            source: image.shared_source(),
            transform: image.transform(),
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            resampler: DeferredResampler::new(image.shared_source(), self.scale),
            resize_mode: self.stretch.resize_mode(),
            background: self.background.pixel(),
            process: ProcessPolicy {
                dither: self.dither.kernel(),
                algorithm: self.algorithm.algorithm(),
            },
        }
    }
}

/// Evaluate every deferred resampler in a batch, one outcome per record.
///
/// A failure for one image does not stop the others.
pub fn evaluate_batch(batch: &[ResolvedSettings]) -> Vec<Result<Resampler, ResolveError>> {
    batch.iter().map(ResolvedSettings::resampler).collect()
}
