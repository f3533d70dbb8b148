//! Fixed catalogs of named conversion choices.
//!
//! Each catalog is an enum whose variant order is part of the persisted
//! configuration format: the config file stores only the position of the
//! selected entry (see [`Selections`](crate::config::Selections)). Reordering
//! variants silently changes every user's selection, so new entries go at the
//! end of [`Catalog::ALL`].
//!
//! | Catalog | Entries | Strategy carried |
//! |---|---|---|
//! | [`StretchOption`] | Uniform, Stretch, Crop | [`ResizeMode`] |
//! | [`ScalingOption`] | Automatic, Pixel Art, Bicubic | size → [`Resampler`] + [`ScalingMode`] |
//! | [`DitherOption`] | None, Floyd Steinberg, Burks | optional [`DiffusionKernel`] |
//! | [`AlgorithmOption`] | Good Fast … Oklab | [`ColorAlgorithm`] |
//! | [`BackgroundOption`] | Transparent, White, Black | `Rgba<u8>` fill |

use crate::config::{ConfigError, Selections};
use crate::imaging::Dimensions;
use image::Rgba;
use image::imageops::FilterType;
use serde::Serialize;
use std::fmt;

/// Both edges must exceed this for [`ScalingOption::Automatic`] to pick the
/// smooth resampler.
pub const AUTO_SMOOTH_THRESHOLD: u32 = 128;

/// A fixed, ordered catalog of named entries.
pub trait Catalog: Copy + PartialEq + fmt::Debug + Sized + 'static {
    /// Key used in config files, CLI arguments and error messages.
    const KIND: &'static str;
    /// Every entry, in persisted-index order.
    const ALL: &'static [Self];

    /// Display name of the entry.
    fn name(self) -> &'static str;

    /// Read this catalog's selection index out of `selections`.
    fn slot(selections: &Selections) -> usize;

    /// Mutable access to this catalog's selection index.
    fn slot_mut(selections: &mut Selections) -> &mut usize;

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&entry| entry == self)
            .unwrap_or_default()
    }

    /// Map a persisted index back to its entry.
    fn from_index(index: usize) -> Result<Self, ConfigError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ConfigError::InvalidSelectionIndex {
                catalog: Self::KIND,
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: Self::ALL.len(),
            })
    }

    /// Look an entry up by display name (case-insensitive, spaces and dashes
    /// interchangeable).
    fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_name(name);
        Self::ALL
            .iter()
            .copied()
            .find(|entry| normalize_name(entry.name()) == wanted)
    }

    /// The entry after this one, wrapping to the first.
    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The entry before this one, wrapping to the last.
    fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
}

// ============================================================================
// Stretch
// ============================================================================

/// How the source is fitted into the grid's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResizeMode {
    /// Scale uniformly until one edge fits; the rest is background.
    Max,
    /// Scale each axis independently to fill exactly.
    Stretch,
    /// Scale uniformly until both edges cover, then center crop.
    Crop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StretchOption {
    Uniform,
    Stretch,
    Crop,
}

impl StretchOption {
    pub fn resize_mode(self) -> ResizeMode {
        match self {
            StretchOption::Uniform => ResizeMode::Max,
            StretchOption::Stretch => ResizeMode::Stretch,
            StretchOption::Crop => ResizeMode::Crop,
        }
    }
}

impl Catalog for StretchOption {
    const KIND: &'static str = "stretch";
    const ALL: &'static [Self] = &[
        StretchOption::Uniform,
        StretchOption::Stretch,
        StretchOption::Crop,
    ];

    fn name(self) -> &'static str {
        match self {
            StretchOption::Uniform => "Uniform",
            StretchOption::Stretch => "Stretch",
            StretchOption::Crop => "Crop",
        }
    }

    fn slot(selections: &Selections) -> usize {
        selections.stretch
    }

    fn slot_mut(selections: &mut Selections) -> &mut usize {
        &mut selections.stretch
    }
}

// ============================================================================
// Scaling
// ============================================================================

/// Resampling filter family handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resampler {
    NearestNeighbor,
    Bicubic,
}

impl Resampler {
    pub fn filter_type(self) -> FilterType {
        match self {
            Resampler::NearestNeighbor => FilterType::Nearest,
            Resampler::Bicubic => FilterType::CatmullRom,
        }
    }

    /// The preview hint that matches this resampler.
    pub fn scaling_mode(self) -> ScalingMode {
        match self {
            Resampler::NearestNeighbor => ScalingMode::Crisp,
            Resampler::Bicubic => ScalingMode::Smooth,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resampler::NearestNeighbor => "nearest-neighbor",
            Resampler::Bicubic => "bicubic",
        }
    }
}

/// Render hint for previews of the current image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalingMode {
    Crisp,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingOption {
    /// Smooth for photos, crisp for small sprites.
    Automatic,
    PixelArt,
    Bicubic,
}

impl ScalingOption {
    /// Pick the resampler for an image of the given native size.
    pub fn resampler_for(self, size: Dimensions) -> Resampler {
        match self {
            ScalingOption::Automatic => {
                if size.width > AUTO_SMOOTH_THRESHOLD && size.height > AUTO_SMOOTH_THRESHOLD {
                    Resampler::Bicubic
                } else {
                    Resampler::NearestNeighbor
                }
            }
            ScalingOption::PixelArt => Resampler::NearestNeighbor,
            ScalingOption::Bicubic => Resampler::Bicubic,
        }
    }

    pub fn mode_for(self, size: Dimensions) -> ScalingMode {
        self.resampler_for(size).scaling_mode()
    }
}

impl Catalog for ScalingOption {
    const KIND: &'static str = "scale";
    const ALL: &'static [Self] = &[
        ScalingOption::Automatic,
        ScalingOption::PixelArt,
        ScalingOption::Bicubic,
    ];

    fn name(self) -> &'static str {
        match self {
            ScalingOption::Automatic => "Automatic",
            ScalingOption::PixelArt => "Pixel Art",
            ScalingOption::Bicubic => "Bicubic",
        }
    }

    fn slot(selections: &Selections) -> usize {
        selections.scale
    }

    fn slot_mut(selections: &mut Selections) -> &mut usize {
        &mut selections.scale
    }
}

// ============================================================================
// Dithering
// ============================================================================

/// An error diffusion kernel.
///
/// Each entry is `(dx, dy, weight)`; a neighbor receives
/// `error * weight / divisor`. `dy` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionKernel {
    pub name: &'static str,
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
}

/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: DiffusionKernel = DiffusionKernel {
    name: "Floyd Steinberg",
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
};

/// ```text
///            X   8   4
///    2   4   8   4   2
/// ```
pub const BURKS: DiffusionKernel = DiffusionKernel {
    name: "Burks",
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherOption {
    None,
    FloydSteinberg,
    Burks,
}

impl DitherOption {
    /// The kernel to diffuse with; `None` means plain nearest-color mapping.
    pub fn kernel(self) -> Option<&'static DiffusionKernel> {
        match self {
            DitherOption::None => None,
            DitherOption::FloydSteinberg => Some(&FLOYD_STEINBERG),
            DitherOption::Burks => Some(&BURKS),
        }
    }
}

impl Catalog for DitherOption {
    const KIND: &'static str = "dither";
    const ALL: &'static [Self] = &[
        DitherOption::None,
        DitherOption::FloydSteinberg,
        DitherOption::Burks,
    ];

    fn name(self) -> &'static str {
        match self {
            DitherOption::None => "None",
            DitherOption::FloydSteinberg => FLOYD_STEINBERG.name,
            DitherOption::Burks => BURKS.name,
        }
    }

    fn slot(selections: &Selections) -> usize {
        selections.dither
    }

    fn slot_mut(selections: &mut Selections) -> &mut usize {
        &mut selections.dither
    }
}

// ============================================================================
// Color matching
// ============================================================================

/// Color-distance strategy the renderer uses to map pixels onto the palette.
///
/// Opaque here: the formulas live with the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorAlgorithm {
    Simple,
    Euclidean,
    Ciede2000,
    Cie76,
    Cmc,
    Oklab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmOption {
    GoodFast,
    Euclidean,
    Ciede2000,
    Cie76,
    Cmc,
    Oklab,
}

impl AlgorithmOption {
    pub fn algorithm(self) -> ColorAlgorithm {
        match self {
            AlgorithmOption::GoodFast => ColorAlgorithm::Simple,
            AlgorithmOption::Euclidean => ColorAlgorithm::Euclidean,
            AlgorithmOption::Ciede2000 => ColorAlgorithm::Ciede2000,
            AlgorithmOption::Cie76 => ColorAlgorithm::Cie76,
            AlgorithmOption::Cmc => ColorAlgorithm::Cmc,
            AlgorithmOption::Oklab => ColorAlgorithm::Oklab,
        }
    }
}

impl Catalog for AlgorithmOption {
    const KIND: &'static str = "algorithm";
    const ALL: &'static [Self] = &[
        AlgorithmOption::GoodFast,
        AlgorithmOption::Euclidean,
        AlgorithmOption::Ciede2000,
        AlgorithmOption::Cie76,
        AlgorithmOption::Cmc,
        AlgorithmOption::Oklab,
    ];

    fn name(self) -> &'static str {
        match self {
            AlgorithmOption::GoodFast => "Good Fast",
            AlgorithmOption::Euclidean => "Euclidean",
            AlgorithmOption::Ciede2000 => "CIEDE2000",
            AlgorithmOption::Cie76 => "CIE76",
            AlgorithmOption::Cmc => "CMC",
            AlgorithmOption::Oklab => "Oklab",
        }
    }

    fn slot(selections: &Selections) -> usize {
        selections.algorithm
    }

    fn slot_mut(selections: &mut Selections) -> &mut usize {
        &mut selections.algorithm
    }
}

// ============================================================================
// Background
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundOption {
    Transparent,
    White,
    Black,
}

impl BackgroundOption {
    /// Fill for grid area the stretched image does not cover.
    pub fn pixel(self) -> Rgba<u8> {
        match self {
            BackgroundOption::Transparent => Rgba([0, 0, 0, 0]),
            BackgroundOption::White => Rgba([255, 255, 255, 255]),
            BackgroundOption::Black => Rgba([0, 0, 0, 255]),
        }
    }
}

impl Catalog for BackgroundOption {
    const KIND: &'static str = "background";
    const ALL: &'static [Self] = &[
        BackgroundOption::Transparent,
        BackgroundOption::White,
        BackgroundOption::Black,
    ];

    fn name(self) -> &'static str {
        match self {
            BackgroundOption::Transparent => "Transparent",
            BackgroundOption::White => "White",
            BackgroundOption::Black => "Black",
        }
    }

    fn slot(selections: &Selections) -> usize {
        selections.background
    }

    fn slot_mut(selections: &mut Selections) -> &mut usize {
        &mut selections.background
    }
}

/// Hex form of a pixel, `#rrggbbaa`.
pub fn pixel_hex(pixel: Rgba<u8>) -> String {
    let [r, g, b, a] = pixel.0;
    format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
}

/// Catalog kinds and their entry names, in display order.
pub fn all_catalogs() -> Vec<(&'static str, Vec<&'static str>)> {
    fn names<C: Catalog>() -> (&'static str, Vec<&'static str>) {
        (C::KIND, C::ALL.iter().map(|e| e.name()).collect())
    }
    vec![
        names::<StretchOption>(),
        names::<ScalingOption>(),
        names::<DitherOption>(),
        names::<AlgorithmOption>(),
        names::<BackgroundOption>(),
    ]
}

/// Position of the entry called `name` in the catalog of kind `kind`.
pub fn index_by_name(kind: &str, name: &str) -> Option<usize> {
    fn find<C: Catalog>(name: &str) -> Option<usize> {
        C::from_name(name).map(C::index)
    }
    match kind {
        StretchOption::KIND => find::<StretchOption>(name),
        ScalingOption::KIND => find::<ScalingOption>(name),
        DitherOption::KIND => find::<DitherOption>(name),
        AlgorithmOption::KIND => find::<AlgorithmOption>(name),
        BackgroundOption::KIND => find::<BackgroundOption>(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sizes_are_fixed() {
        assert_eq!(StretchOption::ALL.len(), 3);
        assert_eq!(ScalingOption::ALL.len(), 3);
        assert_eq!(DitherOption::ALL.len(), 3);
        assert_eq!(AlgorithmOption::ALL.len(), 6);
        assert_eq!(BackgroundOption::ALL.len(), 3);
    }

    #[test]
    fn index_round_trips_through_from_index() {
        for &entry in AlgorithmOption::ALL {
            assert_eq!(AlgorithmOption::from_index(entry.index()).unwrap(), entry);
        }
    }

    #[test]
    fn from_index_out_of_range_is_config_error() {
        let err = DitherOption::from_index(3).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSelectionIndex {
                catalog: "dither",
                index: 3,
                len: 3
            }
        ));
    }

    #[test]
    fn background_next_wraps_after_three_steps() {
        let start = BackgroundOption::from_index(0).unwrap();
        let cycled = start.next().next().next();
        assert_eq!(cycled, start);
        assert_eq!(cycled.index(), 0);
    }

    #[test]
    fn previous_wraps_at_start() {
        assert_eq!(StretchOption::Uniform.previous(), StretchOption::Crop);
        assert_eq!(StretchOption::Crop.previous(), StretchOption::Stretch);
    }

    #[test]
    fn automatic_scaling_prefers_bicubic_for_large_images() {
        let big = Dimensions::new(200, 200);
        assert_eq!(ScalingOption::Automatic.resampler_for(big), Resampler::Bicubic);
        assert_eq!(ScalingOption::Automatic.mode_for(big), ScalingMode::Smooth);
    }

    #[test]
    fn automatic_scaling_needs_both_edges_over_threshold() {
        let narrow = Dimensions::new(64, 200);
        assert_eq!(
            ScalingOption::Automatic.resampler_for(narrow),
            Resampler::NearestNeighbor
        );
        // Exactly 128 is not "over"
        let edge = Dimensions::new(128, 500);
        assert_eq!(ScalingOption::Automatic.mode_for(edge), ScalingMode::Crisp);
    }

    #[test]
    fn fixed_scaling_options_ignore_size() {
        for size in [Dimensions::new(1, 1), Dimensions::new(4000, 3000)] {
            assert_eq!(
                ScalingOption::PixelArt.resampler_for(size),
                Resampler::NearestNeighbor
            );
            assert_eq!(ScalingOption::Bicubic.resampler_for(size), Resampler::Bicubic);
        }
    }

    #[test]
    fn resampler_maps_to_image_filters() {
        assert_eq!(Resampler::NearestNeighbor.filter_type(), FilterType::Nearest);
        assert_eq!(Resampler::Bicubic.filter_type(), FilterType::CatmullRom);
    }

    #[test]
    fn dither_none_has_no_kernel() {
        assert!(DitherOption::None.kernel().is_none());
        assert_eq!(DitherOption::Burks.kernel(), Some(&BURKS));
    }

    #[test]
    fn kernels_propagate_all_error() {
        for kernel in [FLOYD_STEINBERG, BURKS] {
            let sum: u32 = kernel.entries.iter().map(|&(_, _, w)| w as u32).sum();
            assert_eq!(sum, kernel.divisor as u32, "{} weights", kernel.name);
            assert!(kernel.entries.iter().all(|&(dx, dy, _)| dy > 0 || dx > 0));
        }
    }

    #[test]
    fn stretch_options_map_to_resize_modes() {
        assert_eq!(StretchOption::Uniform.resize_mode(), ResizeMode::Max);
        assert_eq!(StretchOption::Stretch.resize_mode(), ResizeMode::Stretch);
        assert_eq!(StretchOption::Crop.resize_mode(), ResizeMode::Crop);
    }

    #[test]
    fn background_pixels() {
        assert_eq!(pixel_hex(BackgroundOption::Transparent.pixel()), "#00000000");
        assert_eq!(pixel_hex(BackgroundOption::White.pixel()), "#ffffffff");
        assert_eq!(pixel_hex(BackgroundOption::Black.pixel()), "#000000ff");
    }

    #[test]
    fn from_name_is_forgiving() {
        assert_eq!(ScalingOption::from_name("pixel-art"), Some(ScalingOption::PixelArt));
        assert_eq!(DitherOption::from_name("floyd_steinberg"), Some(DitherOption::FloydSteinberg));
        assert_eq!(AlgorithmOption::from_name("ciede2000"), Some(AlgorithmOption::Ciede2000));
        assert_eq!(BackgroundOption::from_name("purple"), None);
    }

    #[test]
    fn index_by_name_dispatches_on_kind() {
        assert_eq!(index_by_name("algorithm", "Oklab"), Some(5));
        assert_eq!(index_by_name("background", "black"), Some(2));
        assert_eq!(index_by_name("palette", "black"), None);
    }

    #[test]
    fn all_catalogs_lists_every_kind() {
        let kinds: Vec<&str> = all_catalogs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, ["stretch", "scale", "dither", "algorithm", "background"]);
    }
}
