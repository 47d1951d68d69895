// /app.rs
use crate::{
    ai::CompletionClient,
    game_master::GameMaster,
    message::{Message, MessageType},
    session::ConversationSession,
    tui::{Tui, TuiEvent},
    ui::{self, spinner::Spinner},
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

const SCROLL_STEP: usize = 5;
pub const STILL_THINKING: &str = "⏳ The Game Master is still answering, wait a moment.";

pub enum Action {
    Quit,
    Submit,
    ScrollUp,
    ScrollDown,
    ScrollToBottom,
    TurnFinished {
        session: ConversationSession,
        messages: Vec<Message>,
    },
}

/// Terminal host of one game session.
///
/// The session is moved into the task answering a turn and comes back with its
/// messages, so `session` is `None` exactly while the Game Master is thinking.
pub struct App<C> {
    running: bool,
    game_master: Arc<GameMaster<C>>,
    session: Option<ConversationSession>,

    input: String,
    game_content: Vec<Message>,
    // Lines scrolled up from the bottom of the transcript.
    game_content_scroll: usize,
    spinner: Spinner,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

impl<C: CompletionClient + 'static> App<C> {
    pub fn new(game_master: Arc<GameMaster<C>>) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        let session = game_master.new_session();
        let game_content = game_master.on_session_start(&session);

        Self {
            running: true,
            game_master,
            session: Some(session),
            input: String::new(),
            game_content,
            game_content_scroll: 0,
            spinner: Spinner::new(),
            action_sender,
            action_receiver,
        }
    }

    // Asynchronous function to continuously run and update the application.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?.tick_rate(8.0);
        tui.enter()?;

        while self.running {
            tui.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(event),
                Some(action) = self.action_receiver.recv() => self.handle_action(action),
                else => break,
            }
        }

        // Dropping the Tui restores the terminal.
        Ok(())
    }

    pub fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => {
                if let Some(action) = self.on_key(key_event) {
                    self.handle_action(action);
                }
            }
            TuiEvent::Paste(text) => self.input.push_str(&text.replace(['\r', '\n'], " ")),
            TuiEvent::Tick => {
                if self.is_thinking() {
                    self.spinner.tick();
                }
            }
            TuiEvent::Error => log::error!("Failed to read a terminal event"),
            // Every event is followed by a redraw, which picks up the new size.
            TuiEvent::Resize(_, _) => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::PageUp | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::PageDown | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::End => Some(Action::ScrollToBottom),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Submit => self.submit(),
            Action::ScrollUp => self.game_content_scroll += SCROLL_STEP,
            Action::ScrollDown => {
                self.game_content_scroll = self.game_content_scroll.saturating_sub(SCROLL_STEP)
            }
            Action::ScrollToBottom => self.game_content_scroll = 0,
            Action::TurnFinished { session, messages } => {
                self.session = Some(session);
                self.spinner.reset();
                self.game_content.extend(messages);
                self.game_content_scroll = 0;
            }
        }
    }

    fn submit(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }

        let Some(mut session) = self.session.take() else {
            self.add_message(Message::new(MessageType::System, STILL_THINKING));
            return;
        };

        self.input.clear();
        self.add_message(Message::new(MessageType::User, text.as_str()));

        let game_master = Arc::clone(&self.game_master);
        let sender = self.action_sender.clone();
        tokio::spawn(async move {
            let messages = game_master.on_message(&mut session, &text).await;
            if sender
                .send(Action::TurnFinished { session, messages })
                .is_err()
            {
                log::debug!("Turn finished after the UI closed");
            }
        });
    }

    pub fn add_message(&mut self, message: Message) {
        self.game_content.push(message);
        self.game_content_scroll = 0;
    }

    /// Waits for the next queued action, e.g. a finished turn, and applies it.
    pub async fn process_next_action(&mut self) {
        if let Some(action) = self.action_receiver.recv().await {
            self.handle_action(action);
        }
    }
}

impl<C> App<C> {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_thinking(&self) -> bool {
        self.session.is_none()
    }

    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn game_content(&self) -> &[Message] {
        &self.game_content
    }

    pub fn scroll_offset(&self) -> usize {
        self.game_content_scroll
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }
}
