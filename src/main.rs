//! tgapply - application status client
//!
//! Shows one of several screens (loading, open-in-Telegram, form, pending,
//! approved) depending on the status the server reports, and submits the
//! application form.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use tgapply::application::{App, AppOptions};
use tgapply::domain::FormState;
use tgapply::infrastructure::{config, host, logging, Dispatcher, HttpTransport, Settings};
use tgapply::presentation::{render_ui, InputHandler};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const FRAME: Duration = Duration::from_millis(100);

struct Args {
    config: Option<PathBuf>,
    debug: bool,
}

fn parse_args() -> Result<Option<Args>, Box<dyn std::error::Error>> {
    let mut args = Args { config: None, debug: false };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("tgapply {}", VERSION);
                return Ok(None);
            }
            "--debug" => args.debug = true,
            "--config" => {
                let path = iter.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    Ok(Some(args))
}

/// Entry point.
///
/// Loads settings, sets up logging and the terminal, and runs the event loop
/// until the user quits.
///
/// # Errors
///
/// Returns an error for bad arguments or configuration, or if the terminal
/// cannot be set up.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let mut settings = config::load(args.config.as_deref())?;
    settings.debug |= args.debug;
    logging::init(settings.log_file.as_deref())?;

    let transport = HttpTransport::new(settings.api_url.clone(), settings.request_timeout())?;
    let dispatcher = Dispatcher::new(Arc::new(transport));
    let mut app = App::new(host::detect(), FormState::default(), options(&settings));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let res = run_app(&mut terminal, &mut app, &dispatcher);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "event loop failed");
        println!("{err:?}");
    }

    Ok(())
}

fn options(settings: &Settings) -> AppOptions {
    AppOptions {
        poll_interval: settings.poll_interval(),
        keep_pending_on_poll_error: settings.keep_pending_on_poll_error,
        debug: settings.debug,
        api_url: settings.api_url.clone(),
    }
}

/// Main event loop.
///
/// Each pass draws the screen, hands queued requests to the dispatcher,
/// waits briefly for terminal input, applies finished replies and advances
/// the poll timer.
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        for request in app.take_requests() {
            dispatcher.dispatch(request);
        }

        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    InputHandler::handle_key_event(app, key.code, key.modifiers)
                }
                Event::FocusGained => InputHandler::handle_focus(app, true),
                Event::FocusLost => InputHandler::handle_focus(app, false),
                _ => {}
            }
        }

        for response in dispatcher.drain() {
            app.handle_response(response);
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
