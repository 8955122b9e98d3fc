//! Binary entry point: parses the `-d` flag, opens the display, wires
//! the layout engine to an `XlibBackend`, and drives the single-threaded
//! event loop. Grounded in the reference crate's `main`/`Rdwm::run`.

use std::process::ExitCode;

use log::{error, info};

use tilewm::backend::xlib::XlibBackend;
use tilewm::config::Config;
use tilewm::engine::LayoutEngine;
use tilewm::event_router::EventRouter;
use tilewm::node::ScreenDescriptor;

/// The backend file descriptor is polled with this timeout so the
/// status bar still ticks during idle periods (§5).
const POLL_TIMEOUT_MS: i32 = 100;

fn usage() -> ! {
    eprintln!("usage: tilewm [-d]");
    std::process::exit(1);
}

fn parse_args() -> bool {
    let mut debug = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-d" => debug = true,
            _ => usage(),
        }
    }
    debug
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.format_timestamp(None).init();
    info!("starting logger OK");
}

fn main() -> ExitCode {
    let debug = parse_args();
    init_logging(debug);

    let settings = match Config::load().and_then(|c| c.resolve()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut backend = match XlibBackend::open() {
        Ok(backend) => backend,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("display opened OK");

    let (root, width, height, root_visual) = backend.default_screen_descriptor();
    if let Err(e) = backend.detect_existing_wm(root) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    backend.select_root_input(root);

    let mut engine = LayoutEngine::new(backend, settings.palette, settings.tile_border_width);
    engine.register_screen(ScreenDescriptor { root, width, height, root_visual });
    engine.render_all();

    let mut router = EventRouter::new(settings.profile);
    router.grab_keys(&mut engine, root);

    let fd = engine.backend().connection_fd();
    while router.is_running() {
        block_until_readable(fd, POLL_TIMEOUT_MS);

        while engine.backend_mut().pending() > 0 {
            let raw = engine.backend_mut().next_event();
            let event = engine.backend_mut().translate_event(&raw);
            router.handle_event(&mut engine, event);
            if !router.is_running() {
                break;
            }
        }

        engine.refresh_status();
    }

    info!("finish OK");
    ExitCode::SUCCESS
}

/// Block on the backend's connection fd becoming readable, or until
/// `timeout_ms` elapses, whichever comes first. A timed-out poll is not
/// an error: it's how the status tick fires during idle periods.
fn block_until_readable(fd: i32, timeout_ms: i32) {
    let mut pollfd = libc::pollfd { fd, events: libc::POLLIN, revents: 0 };
    unsafe {
        libc::poll(&mut pollfd, 1, timeout_ms);
    }
}
