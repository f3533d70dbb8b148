//! An import session: the controller that owns the queue and the settings.
//!
//! The session turns discrete user commands ([`Command`]) into queue and
//! selection mutations. Results reach the caller through the event channel
//! returned by [`ImportSession::new`]; the caller polls it after each command
//! and tears the session down when it sees [`QueueEvent::Closed`].
//!
//! Command syntax, one per line:
//!
//! ```text
//! rotate <degrees>        flip-h            flip-v
//! next | prev | nav <n>   goto <id>
//! discard | discard-all   confirm | confirm-all
//! bg                      select <catalog> <index|name>
//! grid <width> <height>
//! ```

use crate::config::{ConfigError, ImportConfig};
use crate::options::{BackgroundOption, Catalog, ScalingMode, ScalingOption, index_by_name};
use crate::queue::{ImageId, PreviewQueue, QueueError, QueueEvent};
use crate::resolve::SettingsResolver;
use crate::source::PendingSource;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid command: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Rotate(f32),
    FlipHorizontal,
    FlipVertical,
    Navigate(i64),
    SwitchTo(ImageId),
    Discard,
    DiscardAll,
    Confirm,
    ConfirmAll,
    ChangeBackground,
    Select { catalog: String, index: usize },
    Grid { width: u32, height: u32 },
}

fn parse_arg<T: FromStr>(arg: Option<&str>, what: &str) -> Result<T, SessionError> {
    let raw = arg.ok_or_else(|| SessionError::Parse(format!("missing {what}")))?;
    raw.parse()
        .map_err(|_| SessionError::Parse(format!("bad {what}: '{raw}'")))
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| SessionError::Parse("empty command".into()))?;

        let command = match verb {
            "rotate" => {
                let degrees: f32 = parse_arg(words.next(), "angle")?;
                if !degrees.is_finite() {
                    return Err(SessionError::Parse(format!("bad angle: '{degrees}'")));
                }
                Command::Rotate(degrees)
            }
            "flip-h" => Command::FlipHorizontal,
            "flip-v" => Command::FlipVertical,
            "next" => Command::Navigate(1),
            "prev" => Command::Navigate(-1),
            "nav" => Command::Navigate(parse_arg(words.next(), "offset")?),
            "goto" => {
                let raw = words.next().map(|w| w.trim_start_matches('#'));
                Command::SwitchTo(ImageId(parse_arg(raw, "image id")?))
            }
            "discard" => Command::Discard,
            "discard-all" => Command::DiscardAll,
            "confirm" => Command::Confirm,
            "confirm-all" => Command::ConfirmAll,
            "bg" => Command::ChangeBackground,
            "select" => {
                let catalog: String = parse_arg(words.next(), "catalog")?;
                let value: Vec<&str> = words.by_ref().collect();
                if value.is_empty() {
                    return Err(SessionError::Parse("missing selection".into()));
                }
                let value = value.join(" ");
                let index = match value.parse::<usize>() {
                    Ok(index) => index,
                    Err(_) => index_by_name(&catalog, &value).ok_or_else(|| {
                        SessionError::Parse(format!("no {catalog} option named '{value}'"))
                    })?,
                };
                Command::Select { catalog, index }
            }
            "grid" => Command::Grid {
                width: parse_arg(words.next(), "width")?,
                height: parse_arg(words.next(), "height")?,
            },
            other => return Err(SessionError::Parse(format!("unknown command '{other}'"))),
        };

        if let Some(extra) = words.next() {
            return Err(SessionError::Parse(format!("unexpected argument '{extra}'")));
        }
        Ok(command)
    }
}

pub struct ImportSession {
    config: ImportConfig,
    queue: PreviewQueue,
    events: Sender<QueueEvent>,
    config_dirty: bool,
}

impl ImportSession {
    /// Start a session; the receiver yields every queue event.
    ///
    /// Fails if the persisted selections are out of range.
    pub fn new(config: ImportConfig) -> Result<(Self, Receiver<QueueEvent>), ConfigError> {
        config.validate()?;
        let (tx, rx) = mpsc::channel();
        let session = Self {
            config,
            queue: PreviewQueue::with_events(tx.clone()),
            events: tx,
            config_dirty: false,
        };
        Ok((session, rx))
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn queue(&self) -> &PreviewQueue {
        &self.queue
    }

    /// Selections or grid changed since the session started.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    pub fn add_images(&mut self, sources: Vec<PendingSource>) -> Vec<ImageId> {
        self.queue.add(sources)
    }

    /// Render hint for previewing the current image.
    ///
    /// Crisp when there is no current image or its size cannot be read.
    pub fn current_mode(&self) -> ScalingMode {
        let Some(image) = self.queue.current() else {
            return ScalingMode::Crisp;
        };
        let Ok(scale) = self.config.selections.get::<ScalingOption>() else {
            return ScalingMode::Crisp;
        };
        match image.source().size() {
            Ok(size) => scale.mode_for(size),
            Err(e) => {
                log::warn!("no size for {}: {}", image.source().path().display(), e);
                ScalingMode::Crisp
            }
        }
    }

    /// Select `entry` in its catalog.
    pub fn select<C: Catalog>(&mut self, entry: C) {
        self.config.selections.set(entry);
        self.after_selection_change(C::KIND);
    }

    pub fn execute(&mut self, command: Command) -> Result<(), SessionError> {
        log::debug!("execute {:?}", command);
        match command {
            Command::Rotate(degrees) => {
                if let Some(image) = self.queue.current_mut() {
                    image.transform_mut().rotate(degrees);
                }
            }
            Command::FlipHorizontal => {
                if let Some(image) = self.queue.current_mut() {
                    image.transform_mut().flip_horizontal();
                }
            }
            Command::FlipVertical => {
                if let Some(image) = self.queue.current_mut() {
                    image.transform_mut().flip_vertical();
                }
            }
            Command::Navigate(delta) => self.queue.navigate(delta),
            Command::SwitchTo(id) => self.queue.jump_to(id)?,
            Command::Discard => self.queue.discard_current()?,
            Command::DiscardAll => self.queue.discard_all(),
            Command::Confirm => {
                let resolver = SettingsResolver::from_config(&self.config)?;
                self.queue.confirm_current(&resolver)?;
            }
            Command::ConfirmAll => {
                let resolver = SettingsResolver::from_config(&self.config)?;
                self.queue.confirm_all(&resolver)?;
            }
            Command::ChangeBackground => {
                self.config.selections.cycle::<BackgroundOption>()?;
                self.after_selection_change(BackgroundOption::KIND);
            }
            Command::Select { catalog, index } => {
                self.config.selections.set_by_kind(&catalog, index)?;
                self.after_selection_change(&catalog);
            }
            Command::Grid { width, height } => {
                if width == 0 || height == 0 {
                    return Err(ConfigError::Validation(
                        "grid width and height must be positive".into(),
                    )
                    .into());
                }
                self.config.grid.width = width;
                self.config.grid.height = height;
                self.config_dirty = true;
            }
        }
        Ok(())
    }

    fn after_selection_change(&mut self, kind: &str) {
        self.config_dirty = true;
        if kind == ScalingOption::KIND {
            if self.events.send(QueueEvent::CurrentModeChanged).is_err() {
                log::debug!("event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::options::{DitherOption, Resampler};
    use crate::test_helpers::{drain_events, sources};
    use std::sync::Arc;

    fn session_with(
        backend: &Arc<MockBackend>,
        paths: &[&str],
    ) -> (ImportSession, Receiver<QueueEvent>) {
        let (mut session, rx) = ImportSession::new(ImportConfig::default()).unwrap();
        session.add_images(sources(backend, paths));
        drain_events(&rx);
        (session, rx)
    }

    fn run(session: &mut ImportSession, line: &str) -> Result<(), SessionError> {
        session.execute(line.parse()?)
    }

    #[test]
    fn parses_every_command() {
        let cases = [
            ("rotate 90", Command::Rotate(90.0)),
            ("rotate -45.5", Command::Rotate(-45.5)),
            ("flip-h", Command::FlipHorizontal),
            ("flip-v", Command::FlipVertical),
            ("next", Command::Navigate(1)),
            ("prev", Command::Navigate(-1)),
            ("nav -7", Command::Navigate(-7)),
            ("goto 3", Command::SwitchTo(ImageId(3))),
            ("goto #4", Command::SwitchTo(ImageId(4))),
            ("discard", Command::Discard),
            ("discard-all", Command::DiscardAll),
            ("confirm", Command::Confirm),
            ("confirm-all", Command::ConfirmAll),
            ("bg", Command::ChangeBackground),
            ("grid 3 2", Command::Grid { width: 3, height: 2 }),
            (
                "select dither 2",
                Command::Select {
                    catalog: "dither".into(),
                    index: 2,
                },
            ),
            (
                "select scale pixel art",
                Command::Select {
                    catalog: "scale".into(),
                    index: 1,
                },
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>().unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn rejects_malformed_commands() {
        let lines = [
            "",
            "spin",
            "rotate",
            "rotate left",
            "nav 1 2",
            "select scale",
            "select scale huge",
            "grid 3",
        ];
        for line in lines {
            assert!(
                matches!(line.parse::<Command>(), Err(SessionError::Parse(_))),
                "{line:?}"
            );
        }
    }

    #[test]
    fn rotate_rejects_non_finite_angles() {
        for line in ["rotate inf", "rotate -inf", "rotate NaN", "rotate infinity"] {
            assert!(
                matches!(line.parse::<Command>(), Err(SessionError::Parse(_))),
                "{line:?}"
            );
        }

        let backend = Arc::new(MockBackend::new());
        let (mut session, _rx) = session_with(&backend, &["a.png"]);
        run(&mut session, "rotate 30").unwrap();
        session.execute(Command::Rotate(f32::INFINITY)).unwrap();
        let rotation = session.queue().current().unwrap().transform().rotation();
        assert_eq!(rotation, 30.0);
    }

    #[test]
    fn transform_commands_apply_to_current_image() {
        let backend = Arc::new(MockBackend::new());
        let (mut session, _rx) = session_with(&backend, &["a.png", "b.png"]);

        run(&mut session, "next").unwrap();
        run(&mut session, "flip-h").unwrap();
        run(&mut session, "rotate 90").unwrap();

        let images: Vec<_> = session.queue().iter().map(|i| i.transform()).collect();
        assert!(images[0].is_identity());
        assert_eq!(images[1].scale_x(), -1);
        assert_eq!(images[1].rotation(), -90.0);
    }

    #[test]
    fn transform_commands_on_empty_session_are_noops() {
        let (mut session, _rx) = ImportSession::new(ImportConfig::default()).unwrap();
        run(&mut session, "rotate 90").unwrap();
        run(&mut session, "flip-v").unwrap();
        run(&mut session, "next").unwrap();
        assert!(matches!(
            run(&mut session, "discard"),
            Err(SessionError::Queue(QueueError::EmptyQueue))
        ));
    }

    #[test]
    fn confirm_uses_selections_at_confirm_time() {
        let backend = Arc::new(MockBackend::with_dimensions(&[("a.png", 300, 300)]));
        let (mut session, rx) = session_with(&backend, &["a.png"]);

        run(&mut session, "select scale pixel-art").unwrap();
        run(&mut session, "select dither burks").unwrap();
        run(&mut session, "confirm").unwrap();

        let events = drain_events(&rx);
        let batch = events
            .iter()
            .find_map(|e| match e {
                QueueEvent::Confirmed(b) => Some(b),
                _ => None,
            })
            .unwrap();
        assert_eq!(batch[0].resampler().unwrap(), Resampler::NearestNeighbor);
        assert_eq!(batch[0].process().dither, DitherOption::Burks.kernel());
        assert!(matches!(events.last(), Some(QueueEvent::Closed)));
    }

    #[test]
    fn change_background_cycles_and_marks_dirty() {
        let (mut session, _rx) = ImportSession::new(ImportConfig::default()).unwrap();
        assert!(!session.is_config_dirty());
        for _ in 0..3 {
            run(&mut session, "bg").unwrap();
        }
        assert_eq!(session.config().selections.background, 0);
        assert!(session.is_config_dirty());
    }

    #[test]
    fn scale_selection_fires_mode_change() {
        let backend = Arc::new(MockBackend::with_dimensions(&[("a.png", 300, 300)]));
        let (mut session, rx) = session_with(&backend, &["a.png"]);
        assert_eq!(session.current_mode(), ScalingMode::Smooth);

        session.select(ScalingOption::PixelArt);
        assert_eq!(session.current_mode(), ScalingMode::Crisp);
        assert!(matches!(
            drain_events(&rx).as_slice(),
            [QueueEvent::CurrentModeChanged]
        ));
    }

    #[test]
    fn selection_survives_dropped_receiver() {
        let (mut session, rx) = ImportSession::new(ImportConfig::default()).unwrap();
        drop(rx);
        run(&mut session, "select scale bicubic").unwrap();
        assert_eq!(session.config().selections.scale, 2);
        assert!(session.is_config_dirty());
    }

    #[test]
    fn current_mode_defaults_to_crisp() {
        let backend = Arc::new(MockBackend::new());
        let (session, _rx) = ImportSession::new(ImportConfig::default()).unwrap();
        assert_eq!(session.current_mode(), ScalingMode::Crisp);

        let (session, _rx) = session_with(&backend, &["unreadable.png"]);
        assert_eq!(session.current_mode(), ScalingMode::Crisp);
    }

    #[test]
    fn goto_unknown_image_is_not_found() {
        let backend = Arc::new(MockBackend::new());
        let (mut session, _rx) = session_with(&backend, &["a.png"]);
        assert!(matches!(
            run(&mut session, "goto 9"),
            Err(SessionError::Queue(QueueError::NotFound(ImageId(9))))
        ));
    }

    #[test]
    fn grid_command_validates() {
        let (mut session, _rx) = ImportSession::new(ImportConfig::default()).unwrap();
        run(&mut session, "grid 4 2").unwrap();
        assert_eq!(session.config().grid.width, 4);
        assert_eq!(session.config().grid.height, 2);
        assert!(matches!(
            run(&mut session, "grid 0 2"),
            Err(SessionError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn corrupt_config_refuses_session() {
        let mut config = ImportConfig::default();
        config.selections.algorithm = 99;
        assert!(matches!(
            ImportSession::new(config),
            Err(ConfigError::InvalidSelectionIndex { .. })
        ));
    }
}
