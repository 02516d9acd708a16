mod cli;
mod config;
mod error;
mod files;
mod keymap;
mod loader;
mod query;
mod router;
mod thumbs;
mod ui;
mod zoom;

use std::sync::{Arc, Condvar, Mutex};
use winit::event_loop::EventLoop;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::files::Gallery;
use crate::keymap::Keymap;
use crate::loader::{spawn_decode_workers, worker_count, CacheState, SharedState, UserEvent};
use crate::ui::state::Viewer;
use crate::ui::App;
use crate::zoom::Size;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let cli = cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&query::pairs(&cli.query));

    let keymap = match &cli.keys {
        Some(path) => Keymap::load(path)?,
        None => Keymap::builtin()?,
    };

    let gallery = Gallery::open(&cli.dir, cli.file_list.as_deref(), cli.recursive, cli.title)?;

    if cli.make_thumbnails {
        let written = thumbs::generate(&gallery, cli.resolution)?;
        println!("{} thumbnails written to {}", written, gallery.root.join("thumbs").display());
        return Ok(());
    }

    let gallery = Arc::new(gallery);
    let thumbnail_bound = config.thumbnail_max_width;
    let preload = config.preload_images;
    let viewer = Viewer::new(Arc::clone(&gallery), config, keymap, &cli.query, Size::new(1280, 720));

    let mut cache = CacheState::new(gallery.len(), preload);
    cache.set_current_idx(viewer.state.current_index - 1);
    let shared: SharedState = Arc::new((Mutex::new(cache), Condvar::new()));

    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();

    let num_threads = worker_count();
    log::debug!("Starting {} decode workers", num_threads);
    spawn_decode_workers(Arc::clone(&shared), gallery, proxy, thumbnail_bound, num_threads);

    let mut app = App::new(viewer, shared);
    event_loop.run_app(&mut app)?;
    Ok(())
}
