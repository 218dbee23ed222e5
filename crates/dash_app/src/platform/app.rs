use std::io::{self, Write};
use std::sync::mpsc;

use chrono::{Datelike, Local};
use dash_core::{update, AppState, AppViewModel, Effect, Msg, PageView, Route};
use engine_logging::{engine_debug, engine_info};

use super::commands::spawn_stdin_reader;
use super::config::Settings;
use super::effects::EffectRunner;
use super::render::{render_page, RenderOptions};

const LOG_LINES: usize = 40;

pub fn run_app(settings: Settings) -> io::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(&settings, msg_tx.clone());
    spawn_stdin_reader(msg_tx.clone());

    engine_info!("Dashboard for {} starting at {}", settings.server, settings.initial_path);
    let _ = msg_tx.send(Msg::Navigate(settings.initial_path.clone()));
    drop(msg_tx);

    let mut state = AppState::with_tick_period(settings.tick_period);
    let mut screen = Screen::new(io::stdout());
    while let Ok(msg) = msg_rx.recv() {
        let quitting = matches!(msg, Msg::Shutdown);
        let (next, effects) = update(state, msg);
        state = next;
        for effect in runner.enqueue(effects) {
            screen.apply(effect)?;
        }
        if quitting {
            break;
        }
        if state.consume_dirty() {
            screen.render(&state.view())?;
        }
    }

    runner.shutdown();
    engine_info!("Dashboard stopped");
    Ok(())
}

/// Terminal output plus the little UI state the core leaves to the renderer.
struct Screen<W: Write> {
    out: W,
    follow_log: bool,
    route: Option<Route>,
}

impl<W: Write> Screen<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            follow_log: false,
            route: None,
        }
    }

    fn apply(&mut self, effect: Effect) -> io::Result<()> {
        match effect {
            Effect::SetTitle(title) => {
                engine_debug!("Title: {}", title);
                write!(self.out, "\x1b]0;{title}\x07")?;
                self.out.flush()
            }
            Effect::ScrollLogToBottom => {
                self.follow_log = true;
                Ok(())
            }
            other => {
                engine_debug!("Effect {:?} has no screen counterpart", other);
                Ok(())
            }
        }
    }

    fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.route != self.route {
            self.follow_log = false;
            self.route = view.route.clone();
        }
        if let PageView::Run(run) = &view.page {
            if !run.autoscroll() {
                self.follow_log = false;
            }
        }
        let options = RenderOptions {
            today: Local::now().weekday().num_days_from_sunday() as usize,
            log_lines: LOG_LINES,
            follow_log: self.follow_log,
        };
        write!(self.out, "\x1b[2J\x1b[H{}", render_page(view, &options))?;
        self.out.flush()
    }
}
