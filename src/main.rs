use clap::{Parser, Subcommand};
use mapart_import::config::{self, ImportConfig};
use mapart_import::imaging::{ImageBackend, RustBackend};
use mapart_import::output;
use mapart_import::queue::QueueEvent;
use mapart_import::session::{Command as SessionCommand, ImportSession};
use mapart_import::source::{expand_paths, sources_from_paths};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

#[derive(Parser)]
#[command(name = "mapart-import")]
#[command(about = "Queue images for map-art import and resolve their conversion settings")]
#[command(long_about = "\
Queue images for map-art import and resolve their conversion settings

Images are added to a preview queue. Each one carries its own rotation and
mirror flags; stretch, scaling, dithering, color algorithm and background are
global selections shared by every image and remembered between runs.

Session commands (one per line on stdin):

  rotate <deg>           rotate the current image
  flip-h | flip-v        mirror the current image
  next | prev | nav <n>  move the cursor (wraps around)
  goto <id>              jump to an image by id
  discard | discard-all  drop images without importing
  confirm | confirm-all  resolve settings and import
  bg                     cycle the background color
  select <catalog> <i>   pick an option by index or name
  grid <w> <h>           set the target grid size
  status                 show the queue

The session ends when the queue is empty or stdin closes.

Run 'mapart-import options' to list every catalog, and
'mapart-import gen-config' for a documented config file.")]
#[command(version)]
struct Cli {
    /// Settings file holding the grid size and option selections
    #[arg(long, default_value = "mapart-import.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue images and run an interactive import session
    Session {
        /// Image files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print confirmed settings as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List every option catalog with the current selection
    Options,
    /// Persist one option selection
    Select {
        /// Catalog: stretch, scale, dither, algorithm or background
        catalog: String,
        /// Entry index or name
        value: String,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Session { paths, json } => {
            let config = config::load_config(&cli.config)?;
            run_session(&cli.config, config, &paths, json)?;
        }
        Command::Options => {
            let config = config::load_config(&cli.config)?;
            output::print_options(&config.selections);
        }
        Command::Select { catalog, value } => {
            let mut config = config::load_config(&cli.config)?;
            let command: SessionCommand = format!("select {catalog} {value}").parse()?;
            if let SessionCommand::Select { catalog, index } = command {
                config.selections.set_by_kind(&catalog, index)?;
            }
            config::save_config(&cli.config, &config)?;
            output::print_options(&config.selections);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_session(
    config_path: &Path,
    config: ImportConfig,
    paths: &[PathBuf],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn ImageBackend> = Arc::new(RustBackend::new());
    let files = expand_paths(paths);
    if files.is_empty() {
        return Err("no images found".into());
    }

    let (mut session, events) = ImportSession::new(config)?;
    session.add_images(sources_from_paths(files, &backend));
    drain_events(&events, json)?;
    output::print_status(session.queue(), session.current_mode());

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "status" {
            output::print_status(session.queue(), session.current_mode());
            continue;
        }
        if let Err(e) = line
            .parse::<SessionCommand>()
            .and_then(|command| session.execute(command))
        {
            eprintln!("error: {e}");
        }
        if drain_events(&events, json)? {
            break;
        }
    }

    if session.is_config_dirty() {
        config::save_config(config_path, session.config())?;
        log::info!("saved selections to {}", config_path.display());
    }
    Ok(())
}

/// Print everything the session has sent; true once the queue has closed.
fn drain_events(
    events: &Receiver<QueueEvent>,
    json: bool,
) -> Result<bool, serde_json::Error> {
    let mut closed = false;
    for event in events.try_iter() {
        closed |= matches!(event, QueueEvent::Closed);
        let lines = match &event {
            QueueEvent::Confirmed(batch) if json => output::format_confirmed_json(batch)?,
            _ => output::format_event(&event),
        };
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(closed)
}
