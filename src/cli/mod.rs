//! Command-line interface parsing and the interactive entrypoint.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::backend::local::LocalBackend;
use crate::controller::Controller;
use crate::core::chat::User;
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::ui::input::TerminalInput;
use crate::ui::terminal::TerminalSurface;
use crate::utils::logging;

#[derive(Parser, Debug)]
#[command(name = "termgram")]
#[command(version, about = "A terminal messenger client")]
#[command(long_about = "termgram is a full-screen terminal messenger with vim-style keys.\n\n\
Chat list:\n\
  j/k, J/K          Move by one (or a count, e.g. 5j) / by ten\n\
  gg, G             First / last chat\n\
  l, Enter          Open chat\n\
  u, p, m, r        Toggle unread / pin / mute, mark read\n\
  q                 Quit\n\n\
Messages:\n\
  j/k, G, gg        Older / newer, newest, oldest\n\
  i, I              Write a message inline / in the editor\n\
  e, dd, D, l       Edit, delete, download, open\n\
  sd sp sa sv, v    Send document, photo, audio, video; record voice\n\
  h, [ ]            Back to chats, previous / next chat")]
pub struct Args {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(short = 'l', long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Id of the local user
    #[arg(short = 'u', long, value_name = "ID")]
    pub user_id: Option<i64>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Command-line values take precedence over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(log) = &self.log {
            config.log_file = Some(log.clone());
        }
        if let Some(user_id) = self.user_id {
            config.user_id = Some(user_id);
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    if args.init_config {
        let path = args
            .config
            .clone()
            .or_else(Config::default_config_path)
            .ok_or("no config directory available on this platform")?;
        config.save_to_path(&path)?;
        println!("Wrote {}", path_display(&path));
        return Ok(());
    }

    if let Some(log_file) = &config.log_file {
        logging::init(log_file)?;
    }

    tokio::runtime::Runtime::new()?.block_on(run_session(config))
}

async fn run_session(config: Config) -> Result<(), Box<dyn Error>> {
    let me = User {
        id: config.user_id(),
        first_name: "Me".into(),
        last_name: String::new(),
    };
    info!(user_id = me.id, "Starting session");
    let (backend, updates) = LocalBackend::demo(me);

    let mut input = TerminalInput::spawn();
    let surface = TerminalSurface::new(input.pause_handle())?;
    let controller = Arc::new(Controller::new(Arc::new(backend), surface, config));

    let listener = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.listen(updates).await })
    };

    controller.run(&mut input).await;
    listener.abort();

    let restored = controller.gate().lock().restore();
    if let Err(err) = &restored {
        warn!(error = %err, "Failed to restore terminal");
    }
    info!("Session ended");
    restored.map_err(Into::into)
}
