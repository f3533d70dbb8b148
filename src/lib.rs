//! # mapart-import
//!
//! The import front end of a map-art converter: a queue of images waiting to
//! be converted, and the machinery that turns the user's choices into the
//! exact settings the renderer needs for each one.
//!
//! # Architecture: Queue, Selections, Resolver
//!
//! ```text
//! paths  →  PendingSource  →  PreviewQueue  →  confirm  →  ResolvedSettings
//!                              ▲          ▲
//!               per-image transform    global selections (config file)
//! ```
//!
//! Each queued image owns its rotation and mirror flags. Everything else
//! (stretch mode, scaling policy, dithering, color algorithm, background and
//! grid size) is global, persisted as catalog indices in a TOML file. On
//! confirm, the [`resolve::SettingsResolver`] combines the two into an
//! immutable [`resolve::ResolvedSettings`] per image, and the queue reports
//! the batch as one [`queue::QueueEvent::Confirmed`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`options`] | Fixed option catalogs and the size-dependent scaling policy |
//! | [`transform`] | Per-image rotation and mirror state |
//! | [`queue`] | Preview queue: cursor, navigation, discard, confirm, events |
//! | [`resolve`] | Settings resolution and the deferred resampler |
//! | [`source`] | Pending sources with a lazily probed, memoized size |
//! | [`imaging`] | Image backend trait and the `image`-crate header reader |
//! | [`config`] | TOML settings: grid size and persisted selections |
//! | [`session`] | Command parsing and the controller driving queue and config |
//! | [`output`] | CLI output formatting for status, options and confirmed batches |
//!
//! # Design Decisions
//!
//! ## Selections Persist as Indices
//!
//! Catalogs are fixed and ordered, so a selection is stored as its position.
//! Loading maps each index back through its catalog and rejects anything out
//! of range instead of clamping it.
//!
//! ## Deferred Resampling
//!
//! The automatic scaling policy picks nearest-neighbor for small sprites and
//! bicubic for larger pictures. Reading the size means touching the file, so
//! the choice is packaged as a [`resolve::DeferredResampler`] that probes on
//! first use and remembers a successful answer.
//!
//! ## Events Over a Channel
//!
//! The queue does not call back into its owner. It sends
//! [`queue::QueueEvent`]s on an `mpsc` channel the controller polls after each
//! command, which keeps the queue free of borrowed closures and lets a batch
//! cross threads.

pub mod config;
pub mod imaging;
pub mod options;
pub mod output;
pub mod queue;
pub mod resolve;
pub mod session;
pub mod source;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
