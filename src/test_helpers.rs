//! Shared test utilities for the mapart-import test suite.
//!
//! Builds sources, queued images and queues on top of the `MockBackend`, and
//! collects queue events from a channel.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let backend = Arc::new(MockBackend::with_dimensions(&[("a.png", 300, 300)]));
//! let mut queue = queue_of(&backend, 3);
//! queue.navigate(-1);
//! assert_eq!(queue.cursor(), 2);
//! ```

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use crate::imaging::Dimensions;
use crate::imaging::backend::tests::MockBackend;
use crate::queue::{ImageId, PreviewQueue, QueueEvent, QueuedImage};
use crate::source::PendingSource;

// =========================================================================
// Sources and images
// =========================================================================

/// One pending source per path, all probing through `backend`.
pub fn sources(backend: &Arc<MockBackend>, paths: &[&str]) -> Vec<PendingSource> {
    paths
        .iter()
        .map(|&p| PendingSource::new(p, backend.clone()))
        .collect()
}

/// A standalone queued image with id 0.
pub fn queued(backend: &Arc<MockBackend>, path: &str) -> QueuedImage {
    QueuedImage::new(ImageId(0), PendingSource::new(path, backend.clone()))
}

/// A standalone queued image whose size is already known.
pub fn queued_with(backend: &Arc<MockBackend>, path: &str, size: Dimensions) -> QueuedImage {
    QueuedImage::new(
        ImageId(0),
        PendingSource::with_size(path, backend.clone(), size),
    )
}

/// A queue holding `n` images named `img0.png`, `img1.png`, …
pub fn queue_of(backend: &Arc<MockBackend>, n: usize) -> PreviewQueue {
    let paths: Vec<String> = (0..n).map(|i| format!("img{i}.png")).collect();
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let mut queue = PreviewQueue::new();
    queue.add(sources(backend, &refs));
    queue
}

// =========================================================================
// Events
// =========================================================================

/// Everything sent so far, without blocking.
pub fn drain_events(rx: &Receiver<QueueEvent>) -> Vec<QueueEvent> {
    rx.try_iter().collect()
}
