// Terminal backend: raw-mode setup, input polling, and tick generation.
// Wraps crossterm + ratatui so the controller only sees key/resize/tick messages.

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::{MAX_TICK_RATE, MIN_TICK_RATE};
use crate::message::Message;

type CrosstermTerminal = Terminal<CrosstermBackend<std::io::Stderr>>;

pub struct Tui {
    terminal: CrosstermTerminal,
    tick_rate: f64,
}

impl Tui {
    pub fn new(tick_rate: f64) -> anyhow::Result<Self> {
        let backend = CrosstermBackend::new(std::io::stderr());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            tick_rate,
        })
    }

    /// Take over the terminal and start feeding input into `tx`.
    pub fn enter(&mut self, tx: mpsc::UnboundedSender<Message>) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(std::io::stderr(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.start_event_polling(tx);
        Ok(())
    }

    pub fn exit(&mut self) -> anyhow::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(std::io::stderr(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn start_event_polling(&self, tx: mpsc::UnboundedSender<Message>) {
        let tick_rate = tick_period(self.tick_rate);

        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let message = tokio::select! {
                    event = reader.next() => match event {
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            Message::Key(key)
                        }
                        Some(Ok(CrosstermEvent::Resize(..))) => Message::Resize,
                        Some(Err(err)) => {
                            tracing::error!(error = %err, "terminal input ended");
                            break;
                        }
                        None => break,
                        _ => continue,
                    },
                    _ = tick_interval.tick() => Message::Tick,
                };
                if tx.send(message).is_err() {
                    break;
                }
            }
        });
    }

    pub fn draw<F>(&mut self, f: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

/// Interval between ticks for a rate in ticks per second. Out-of-range and
/// non-finite rates are pulled back into the accepted range, so the period is
/// never zero.
pub fn tick_period(tick_rate: f64) -> Duration {
    let rate = if tick_rate.is_finite() {
        tick_rate.clamp(MIN_TICK_RATE, MAX_TICK_RATE)
    } else if tick_rate > 0.0 {
        MAX_TICK_RATE
    } else {
        MIN_TICK_RATE
    };
    Duration::from_secs_f64(1.0 / rate)
}
