//! Terminal runtime: owns the event loop, executes effects on the tokio
//! runtime and feeds completions back into the state machine.

use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use skycast_core::{Locator, WeatherProvider, fetch_report};
use tokio::sync::mpsc;

use crate::app::{App, Effect, Msg};
use crate::backdrop::Backdrop;
use crate::ui;

/// Frame budget; also bounds input latency.
const FRAME: Duration = Duration::from_millis(33);

/// Session options that shape the runtime but not the state machine.
#[derive(Debug)]
pub struct Options {
    /// Probe the IP location on startup.
    pub detect: bool,
    /// City to fetch immediately, from the command line.
    pub initial_city: Option<String>,
    /// Disable the colored backdrop.
    pub mono: bool,
}

pub async fn run(
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn Locator>,
    options: Options,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>(16);

    let mut session = Session {
        app: App::new(),
        backdrop: Backdrop::new(),
        provider,
        locator,
        tx,
        rx,
        mono: options.mono,
    };

    let effects = session
        .app
        .start(options.detect, options.initial_city, Instant::now());
    session.perform(effects);

    let mut terminal = setup_terminal()?;
    let res = session.event_loop(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    res
}

struct Session {
    app: App,
    backdrop: Backdrop,
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn Locator>,
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
    mono: bool,
}

impl Session {
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<()> {
        loop {
            // Drain completions coming from spawned probes and fetches.
            while let Ok(msg) = self.rx.try_recv() {
                let effects = self.app.update(msg, Instant::now());
                self.perform(effects);
            }

            // Deadlines and animation advance once per frame.
            let now = Instant::now();
            let effects = self.app.update(Msg::Tick, now);
            self.perform(effects);
            self.backdrop.sync(self.app.scene(), now);

            terminal.draw(|f| ui::draw(f, &self.app, &self.backdrop, self.mono))?;

            if event::poll(FRAME)? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press && self.handle_key(k.code, k.modifiers) {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns true when the session should end.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Esc {
            return true;
        }
        if modifiers.contains(KeyModifiers::CONTROL) {
            // Ctrl-C quits; other chords are not search input.
            return code == KeyCode::Char('c');
        }

        let now = Instant::now();
        let effects = match code {
            KeyCode::Char(c) => self.app.update(Msg::TypedChar(c), now),
            KeyCode::Backspace => self.app.update(Msg::Backspace, now),
            KeyCode::Enter => self.app.update(Msg::Submitted, now),
            _ => Vec::new(),
        };
        self.perform(effects);

        false
    }

    fn perform(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Locate => {
                    let locator = Arc::clone(&self.locator);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = locator.locate().await;
                        tx.send(Msg::Located(outcome)).await.ok();
                    });
                }
                Effect::Fetch { seq, query } => {
                    let provider = Arc::clone(&self.provider);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = fetch_report(provider.as_ref(), &query).await;
                        tx.send(Msg::Fetched {
                            seq,
                            query,
                            outcome,
                        })
                        .await
                        .ok();
                    });
                }
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, DisableLineWrap, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, EnableLineWrap, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    term.show_cursor()?;
    Ok(())
}
