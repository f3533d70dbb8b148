//! The ordered queue of images being prepared for import.
//!
//! [`PreviewQueue`] owns its images and a single cursor. Every mutation goes
//! through the methods below; nothing hands out the underlying `Vec`.
//!
//! ## Cursor
//!
//! `0 <= cursor < len` whenever the queue is non-empty. When it is empty the
//! cursor is `0` and meaningless; [`PreviewQueue::current`] returns `None`.
//!
//! ## Events
//!
//! The controller may attach an `mpsc::Sender<QueueEvent>` and poll the
//! receiver after each command:
//!
//! | Event | Fired |
//! |---|---|
//! | `CurrentImageChanged`, `CurrentModeChanged` | after add, navigate, jump, discard, confirm |
//! | `BatchModeChanged(bool)` | when an add flips batch mode |
//! | `Confirmed(batch)` | once per confirm, before the confirmed images are removed |
//! | `Closed` | once per transition from non-empty to empty |

use crate::resolve::{ResolvedSettings, SettingsResolver};
use crate::source::PendingSource;
use crate::transform::TransformState;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("the import queue is empty")]
    EmptyQueue,
    #[error("image {0} is not in the queue")]
    NotFound(ImageId),
}

/// Stable identity of a queued image, unique within one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum QueueEvent {
    CurrentImageChanged,
    CurrentModeChanged,
    BatchModeChanged(bool),
    Confirmed(Vec<ResolvedSettings>),
    Closed,
}

/// One image in the queue with its transform.
#[derive(Debug)]
pub struct QueuedImage {
    id: ImageId,
    source: Arc<PendingSource>,
    transform: TransformState,
}

impl QueuedImage {
    pub(crate) fn new(id: ImageId, source: PendingSource) -> Self {
        Self {
            id,
            source: Arc::new(source),
            transform: TransformState::default(),
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn source(&self) -> &PendingSource {
        &self.source
    }

    pub(crate) fn shared_source(&self) -> Arc<PendingSource> {
        Arc::clone(&self.source)
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }
}

#[derive(Default)]
pub struct PreviewQueue {
    images: Vec<QueuedImage>,
    cursor: usize,
    next_id: u64,
    batch_mode: bool,
    events: Option<Sender<QueueEvent>>,
}

impl fmt::Debug for PreviewQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewQueue")
            .field("len", &self.images.len())
            .field("cursor", &self.cursor)
            .field("batch_mode", &self.batch_mode)
            .finish_non_exhaustive()
    }
}

impl PreviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that reports its events on `events`.
    pub fn with_events(events: Sender<QueueEvent>) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// More than one image was queued by the most recent add.
    pub fn is_batch_mode(&self) -> bool {
        self.batch_mode
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedImage> {
        self.images.iter()
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.images.iter().position(|img| img.id == id)
    }

    pub fn get(&self, id: ImageId) -> Option<&QueuedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn current(&self) -> Option<&QueuedImage> {
        self.images.get(self.cursor)
    }

    pub fn current_mut(&mut self) -> Option<&mut QueuedImage> {
        self.images.get_mut(self.cursor)
    }

    /// Append `sources` with identity transforms; returns their ids.
    pub fn add(&mut self, sources: impl IntoIterator<Item = PendingSource>) -> Vec<ImageId> {
        let ids: Vec<ImageId> = sources
            .into_iter()
            .map(|source| {
                let id = ImageId(self.next_id);
                self.next_id += 1;
                log::debug!("queued {} as {}", source.path().display(), id);
                self.images.push(QueuedImage::new(id, source));
                id
            })
            .collect();

        self.notify_current_changed();
        let batch_mode = self.images.len() > 1;
        if batch_mode != self.batch_mode {
            self.batch_mode = batch_mode;
            self.emit(QueueEvent::BatchModeChanged(batch_mode));
        }
        ids
    }

    /// Move the cursor by `delta`, wrapping in both directions.
    ///
    /// No-op on an empty queue.
    pub fn navigate(&mut self, delta: i64) {
        let len = self.images.len() as i64;
        if len == 0 {
            return;
        }
        let step = delta.rem_euclid(len);
        self.cursor = ((self.cursor as i64 + step) % len) as usize;
        self.notify_current_changed();
    }

    pub fn jump_to(&mut self, id: ImageId) -> Result<(), QueueError> {
        let index = self.position(id).ok_or(QueueError::NotFound(id))?;
        self.cursor = index;
        self.notify_current_changed();
        Ok(())
    }

    pub fn discard_current(&mut self) -> Result<(), QueueError> {
        self.remove_current().map(|_| ())
    }

    /// Remove everything. A no-op on an empty queue.
    pub fn discard_all(&mut self) {
        self.clear();
    }

    /// Resolve the current image, emit it as a one-element batch, remove it.
    pub fn confirm_current(
        &mut self,
        resolver: &SettingsResolver,
    ) -> Result<Vec<ResolvedSettings>, QueueError> {
        let image = self.current().ok_or(QueueError::EmptyQueue)?;
        let batch = vec![resolver.resolve(image)];
        self.emit_confirmed(&batch);
        self.remove_current()?;
        Ok(batch)
    }

    /// Resolve every image in queue order, emit one batch, clear the queue.
    pub fn confirm_all(
        &mut self,
        resolver: &SettingsResolver,
    ) -> Result<Vec<ResolvedSettings>, QueueError> {
        if self.images.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        let batch: Vec<ResolvedSettings> =
            self.images.iter().map(|img| resolver.resolve(img)).collect();
        self.emit_confirmed(&batch);
        self.clear();
        Ok(batch)
    }

    fn remove_current(&mut self) -> Result<QueuedImage, QueueError> {
        if self.images.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        let removed = self.images.remove(self.cursor);
        if self.cursor >= self.images.len() {
            self.cursor = self.cursor.saturating_sub(1);
        }
        log::debug!("removed {} ({} left)", removed.id, self.images.len());
        self.notify_current_changed();
        self.close_if_drained();
        Ok(removed)
    }

    fn clear(&mut self) {
        if self.images.is_empty() {
            return;
        }
        log::debug!("cleared {} images", self.images.len());
        self.images.clear();
        self.cursor = 0;
        self.notify_current_changed();
        self.close_if_drained();
    }

    /// Only called right after a removal, so an empty queue here means it
    /// just went from non-empty to empty.
    fn close_if_drained(&mut self) {
        if self.images.is_empty() {
            self.emit(QueueEvent::Closed);
        }
    }

    fn notify_current_changed(&self) {
        self.emit(QueueEvent::CurrentImageChanged);
        self.emit(QueueEvent::CurrentModeChanged);
    }

    fn emit_confirmed(&self, batch: &[ResolvedSettings]) {
        let Some(events) = &self.events else {
            return;
        };
        if events.send(QueueEvent::Confirmed(batch.to_vec())).is_err() {
            log::debug!("event receiver dropped");
        }
    }

    fn emit(&self, event: QueueEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                log::debug!("event receiver dropped");
            }
        }
    }
}
