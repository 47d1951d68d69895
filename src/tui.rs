use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};

use color_eyre::eyre::Result;
use futures::{FutureExt, StreamExt};
use ratatui::{
    DefaultTerminal,
    crossterm::{
        event::{
            DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream,
            KeyEvent, KeyEventKind,
        },
        execute,
    },
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
    Tick,
    Error,
}

/// Raw-mode terminal plus a background task forwarding its input as [`TuiEvent`]s.
///
/// The terminal is restored when the value is dropped.
pub struct Tui {
    terminal: DefaultTerminal,
    reader: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
    event_rx: UnboundedReceiver<TuiEvent>,
    event_tx: UnboundedSender<TuiEvent>,
    tick_rate: Duration,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: ratatui::try_init()?,
            reader: None,
            cancellation_token: CancellationToken::new(),
            event_rx,
            event_tx,
            tick_rate: Duration::from_millis(250),
        })
    }

    /// Ticks per second; the spinner advances once per tick.
    pub fn tick_rate(mut self, ticks_per_second: f64) -> Self {
        self.tick_rate = Duration::from_secs_f64(1.0 / ticks_per_second);
        self
    }

    /// Turns on bracketed paste and starts forwarding terminal events.
    pub fn enter(&mut self) -> Result<()> {
        // Without it a paste arrives as a burst of key presses, Enter included.
        execute!(std::io::stdout(), EnableBracketedPaste)?;
        self.cancel();
        self.cancellation_token = CancellationToken::new();
        self.reader = Some(tokio::spawn(read_events(
            self.event_tx.clone(),
            self.cancellation_token.clone(),
            self.tick_rate,
        )));
        log::debug!("Terminal event reader started");
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.cancellation_token.cancel();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }

    pub async fn next(&mut self) -> Option<TuiEvent> {
        self.event_rx.recv().await
    }
}

async fn read_events(
    event_tx: UnboundedSender<TuiEvent>,
    cancellation_token: CancellationToken,
    tick_rate: Duration,
) {
    let mut reader = EventStream::new();
    let mut ticks = tokio::time::interval(tick_rate);

    loop {
        let crossterm_event = reader.next().fuse();
        let event = tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = ticks.tick() => TuiEvent::Tick,
            maybe_event = crossterm_event => match maybe_event {
                Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    TuiEvent::Key(key)
                }
                Some(Ok(CrosstermEvent::Paste(text))) => TuiEvent::Paste(text),
                Some(Ok(CrosstermEvent::Resize(width, height))) => TuiEvent::Resize(width, height),
                Some(Ok(_)) => continue,
                Some(Err(_)) => TuiEvent::Error,
                // Stdin is gone.
                None => break,
            },
        };
        // A closed receiver means the app is gone.
        if event_tx.send(event).is_err() {
            break;
        }
    }
}

impl Deref for Tui {
    type Target = DefaultTerminal;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.cancel();
        if let Err(e) = execute!(std::io::stdout(), DisableBracketedPaste) {
            log::error!("Failed to disable bracketed paste: {e}");
        }
        ratatui::restore();
        log::info!("Quest Master exit: {}", chrono::Local::now());
    }
}
