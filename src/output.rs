//! CLI output formatting for the import session.
//!
//! # Information-First Display
//!
//! Every image is shown by its queue position and its file name, with its
//! queue id in brackets. Settings and transform state follow as indented
//! context lines, the same two-level layout for status and confirm output.
//!
//! # Output Format
//!
//! ## Status
//!
//! ```text
//! Queue (3 images, batch)
//!     001 [#0] dawn.png
//!   > 002 [#1] sprite.png
//!         Size: 16x16
//!         Transform: rotation -90, flip-h
//!         Preview: crisp
//!     003 [#2] mountains.png
//! ```
//!
//! ## Options
//!
//! ```text
//! stretch
//!   * 0 Uniform
//!     1 Stretch
//!     2 Crop
//! ```
//!
//! ## Confirmed
//!
//! ```text
//! Confirmed 2 images
//!     001 dawn.png
//!         Grid: 4x3, resize Max, background #00000000
//!         Transform: identity
//!         Resampler: bicubic
//!         Process: Floyd Steinberg, Simple
//!     002 missing.png
//!         Resampler: error: could not read size of missing.png: ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure
//! apart from evaluating deferred resamplers, which may probe image headers.

use crate::config::Selections;
use crate::options::{ResizeMode, ScalingMode, all_catalogs, pixel_hex};
use crate::queue::{PreviewQueue, QueueEvent};
use crate::resolve::{ResolvedSettings, evaluate_batch};
use crate::transform::TransformState;
use serde::Serialize;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "image" } else { "images" }
}

/// One-line summary of a transform.
///
/// ```text
/// identity
/// rotation 90
/// rotation -45, flip-h, flip-v
/// ```
fn format_transform(transform: TransformState) -> String {
    if transform.is_identity() {
        return "identity".to_string();
    }
    let mut parts = Vec::new();
    if transform.rotation() != 0.0 {
        parts.push(format!("rotation {}", transform.rotation()));
    }
    if transform.scale_x() < 0 {
        parts.push("flip-h".to_string());
    }
    if transform.scale_y() < 0 {
        parts.push("flip-v".to_string());
    }
    parts.join(", ")
}

fn mode_name(mode: ScalingMode) -> &'static str {
    match mode {
        ScalingMode::Crisp => "crisp",
        ScalingMode::Smooth => "smooth",
    }
}

fn resize_name(mode: ResizeMode) -> &'static str {
    match mode {
        ResizeMode::Max => "Max",
        ResizeMode::Stretch => "Stretch",
        ResizeMode::Crop => "Crop",
    }
}

// ============================================================================
// Status
// ============================================================================

/// Format the queue with the current image marked and expanded.
///
/// `mode` is the preview hint for the current image.
pub fn format_status(queue: &PreviewQueue, mode: ScalingMode) -> Vec<String> {
    if queue.is_empty() {
        return vec!["Queue empty".to_string()];
    }

    let mut lines = Vec::new();
    let batch = if queue.is_batch_mode() { ", batch" } else { "" };
    lines.push(format!(
        "Queue ({} {}{})",
        queue.len(),
        plural(queue.len()),
        batch
    ));

    for (i, image) in queue.iter().enumerate() {
        let is_current = i == queue.cursor();
        let marker = if is_current { "  > ".to_string() } else { indent(1) };
        lines.push(format!(
            "{}{} [{}] {}",
            marker,
            format_index(i + 1),
            image.id(),
            image.source().display_name()
        ));
        if is_current {
            if let Some(size) = image.source().known_size() {
                lines.push(format!("{}Size: {}", indent(2), size));
            }
            lines.push(format!(
                "{}Transform: {}",
                indent(2),
                format_transform(image.transform())
            ));
            lines.push(format!("{}Preview: {}", indent(2), mode_name(mode)));
        }
    }
    lines
}

pub fn print_status(queue: &PreviewQueue, mode: ScalingMode) {
    for line in format_status(queue, mode) {
        println!("{}", line);
    }
}

// ============================================================================
// Options
// ============================================================================

/// Format every catalog, marking the selected entry with `*`.
pub fn format_options(selections: &Selections) -> Vec<String> {
    let mut lines = Vec::new();
    for (kind, names) in all_catalogs() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(kind.to_string());
        let selected = selections.index_of(kind);
        for (i, name) in names.iter().enumerate() {
            let marker = if selected == Some(i) { "  * " } else { "    " };
            lines.push(format!("{}{} {}", marker, i, name));
        }
    }
    lines
}

pub fn print_options(selections: &Selections) {
    for line in format_options(selections) {
        println!("{}", line);
    }
}

// ============================================================================
// Events
// ============================================================================

/// Format a queue event as display lines.
pub fn format_event(event: &QueueEvent) -> Vec<String> {
    match event {
        QueueEvent::CurrentImageChanged => vec!["Current image changed".to_string()],
        QueueEvent::CurrentModeChanged => vec!["Preview mode changed".to_string()],
        QueueEvent::BatchModeChanged(true) => vec!["Batch mode on".to_string()],
        QueueEvent::BatchModeChanged(false) => vec!["Batch mode off".to_string()],
        QueueEvent::Confirmed(batch) => format_confirmed(batch),
        QueueEvent::Closed => vec!["Queue closed".to_string()],
    }
}

// ============================================================================
// Confirmed batches
// ============================================================================

/// Format a confirmed batch, evaluating each deferred resampler.
///
/// An image whose size cannot be read reports the error on its resampler
/// line; the rest of the batch is unaffected.
pub fn format_confirmed(batch: &[ResolvedSettings]) -> Vec<String> {
    let mut lines = vec![format!("Confirmed {} {}", batch.len(), plural(batch.len()))];
    let outcomes = evaluate_batch(batch);

    for (i, (settings, outcome)) in batch.iter().zip(outcomes).enumerate() {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(i + 1),
            settings.source().display_name()
        ));
        lines.push(format!(
            "{}Grid: {}x{}, resize {}, background {}",
            indent(2),
            settings.grid_width(),
            settings.grid_height(),
            resize_name(settings.resize_mode()),
            pixel_hex(settings.background())
        ));
        lines.push(format!(
            "{}Transform: {}",
            indent(2),
            format_transform(settings.transform())
        ));
        match outcome {
            Ok(resampler) => {
                lines.push(format!("{}Resampler: {}", indent(2), resampler.name()))
            }
            Err(e) => lines.push(format!("{}Resampler: error: {}", indent(2), e)),
        }
        let process = settings.process();
        lines.push(format!(
            "{}Process: {}, {:?}",
            indent(2),
            process.dither.map_or("no dithering", |k| k.name),
            process.algorithm
        ));
    }
    lines
}

pub fn print_confirmed(batch: &[ResolvedSettings]) {
    for line in format_confirmed(batch) {
        println!("{}", line);
    }
}

/// Machine-readable form of one confirmed image, for `--json`.
#[derive(Debug, Serialize)]
pub struct ConfirmedRecord {
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub grid_width: u32,
    pub grid_height: u32,
    pub rotation: f32,
    pub scale_x: i8,
    pub scale_y: i8,
    pub resize_mode: ResizeMode,
    /// `None` when the size probe failed; see `error`.
    pub resampler: Option<&'static str>,
    pub background: String,
    pub dither: Option<&'static str>,
    pub algorithm: crate::options::ColorAlgorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn confirmed_records(batch: &[ResolvedSettings]) -> Vec<ConfirmedRecord> {
    batch
        .iter()
        .zip(evaluate_batch(batch))
        .map(|(settings, outcome)| {
            let size = settings.source().known_size();
            let transform = settings.transform();
            let process = settings.process();
            let (resampler, error) = match outcome {
                Ok(r) => (Some(r.name()), None),
                Err(e) => (None, Some(e.to_string())),
            };
            ConfirmedRecord {
                path: settings.source().path().display().to_string(),
                width: size.map(|s| s.width),
                height: size.map(|s| s.height),
                grid_width: settings.grid_width(),
                grid_height: settings.grid_height(),
                rotation: transform.rotation(),
                scale_x: transform.scale_x(),
                scale_y: transform.scale_y(),
                resize_mode: settings.resize_mode(),
                resampler,
                background: pixel_hex(settings.background()),
                dither: process.dither.map(|k| k.name),
                algorithm: process.algorithm,
                error,
            }
        })
        .collect()
}

/// One JSON object per line, one line per image.
pub fn format_confirmed_json(batch: &[ResolvedSettings]) -> Result<Vec<String>, serde_json::Error> {
    confirmed_records(batch)
        .iter()
        .map(serde_json::to_string)
        .collect()
}
