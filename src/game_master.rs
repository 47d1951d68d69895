use crate::{
    ai::{Completion, CompletionClient, CompletionRequest, HandoffTool},
    dice::{generate_event, roll_dice},
    error::{AIError, AppError, Result},
    message::{Message, MessageType},
    persona::{Persona, PersonaKind, PersonaRegistry},
    prompts::{ERROR_PREFIX, INTRO_MESSAGE, WELCOME_MESSAGE},
    router::{Command, DelegatedRouter, KeywordRouter, Route, Router, RoutingStrategy},
    session::ConversationSession,
    settings::{RoutingMode, Settings},
};

/// Implements the two UI hooks on top of the persona registry, the router and a
/// completion client. Shared read-only between sessions.
pub struct GameMaster<C> {
    settings: Settings,
    registry: PersonaRegistry,
    router: RoutingStrategy,
    client: C,
}

impl<C: CompletionClient> GameMaster<C> {
    pub fn new(settings: Settings, registry: PersonaRegistry, client: C) -> Self {
        let router = match settings.routing {
            RoutingMode::Keyword => KeywordRouter::from_registry(&registry).into(),
            RoutingMode::Handoff => DelegatedRouter::from_registry(&registry).into(),
        };

        Self {
            settings,
            registry,
            router,
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn new_session(&self) -> ConversationSession {
        ConversationSession::new(self.settings.transcript_policy())
    }

    pub fn on_session_start(&self, session: &ConversationSession) -> Vec<Message> {
        log::info!(
            "Session {} started, routing: {}, model: {}",
            session.id(),
            self.settings.routing,
            self.settings.model
        );
        vec![Message::new(MessageType::System, WELCOME_MESSAGE)]
    }

    /// Answers one player message. Failures come back as an error message and
    /// leave the session ready for the next turn.
    pub async fn on_message(&self, session: &mut ConversationSession, input: &str) -> Vec<Message> {
        if let Err(e) = session.begin_turn() {
            return vec![error_message(&e)];
        }

        let outcome = match Command::parse(input) {
            Some(command) => Ok(self.answer_command(session, command, input)),
            None => self.play_turn(session, input).await,
        };
        session.end_turn();

        match outcome {
            Ok(message) => vec![message],
            Err(e) => {
                log::error!("Session {}: turn failed: {}", session.id(), e);
                vec![error_message(&e)]
            }
        }
    }

    fn answer_command(
        &self,
        session: &mut ConversationSession,
        command: Command,
        input: &str,
    ) -> Message {
        let speaker = PersonaKind::Triage.display_name();
        let text = match command {
            Command::Greeting => return Message::game(speaker, INTRO_MESSAGE),
            Command::Roll => roll_dice(),
            Command::Event => generate_event(),
        };

        log::debug!("Session {}: {:?} answered locally", session.id(), command);
        // Rolls and events become part of the story the personas see next.
        session.append_user(input.trim());
        session.append_assistant(text.as_str());
        Message::game(speaker, text)
    }

    async fn play_turn(&self, session: &mut ConversationSession, input: &str) -> Result<Message> {
        let route = self.router.route(input);
        log::debug!("Session {}: route {:?}", session.id(), route);

        session.append_user(input);

        let (persona, text) = match route {
            Route::Direct(kind) => {
                let persona = self.registry.persona(kind)?;
                (kind, self.ask(persona, session).await?)
            }
            Route::Delegate {
                coordinator,
                targets,
            } => self.delegate(coordinator, &targets, session).await?,
        };

        session.append_assistant(text.as_str());
        session.set_active_persona(persona);
        Ok(Message::game(persona.display_name(), text))
    }

    async fn ask(&self, persona: &Persona, session: &ConversationSession) -> Result<String> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            instructions: persona.instructions().to_string(),
            transcript: session.context().to_vec(),
            handoffs: Vec::new(),
        };

        match self.client.complete(request).await? {
            Completion::Text(text) => Ok(text),
            // Nothing was offered, so a handoff here is a protocol violation.
            Completion::Handoff(target) => {
                Err(AIError::UnknownHandoff(target.to_string()).into())
            }
        }
    }

    async fn delegate(
        &self,
        coordinator: PersonaKind,
        targets: &[PersonaKind],
        session: &ConversationSession,
    ) -> Result<(PersonaKind, String)> {
        let coordinator = self.registry.persona(coordinator)?;
        let handoffs = targets
            .iter()
            .map(|kind| self.registry.persona(*kind).map(HandoffTool::for_persona))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            instructions: delegation_instructions(coordinator, &handoffs),
            transcript: session.context().to_vec(),
            handoffs,
        };

        match self.client.complete(request).await? {
            Completion::Text(text) => Ok((coordinator.kind(), text)),
            Completion::Handoff(target) => {
                log::info!("Session {}: handoff to {}", session.id(), target);
                let persona = self.registry.persona(target)?;
                Ok((target, self.ask(persona, session).await?))
            }
        }
    }
}

fn delegation_instructions(coordinator: &Persona, handoffs: &[HandoffTool]) -> String {
    let mut instructions = format!(
        "{}\n\nYou can transfer the player's turn to one of these agents:\n",
        coordinator.instructions()
    );
    for handoff in handoffs {
        instructions.push_str(&format!(
            "- {} ({}): {}\n",
            handoff.tool_name,
            handoff.target,
            handoff
                .description
                .lines()
                .next()
                .unwrap_or_default()
        ));
    }
    instructions.push_str(
        "\nRules:\n\
         - Fights, attacks, enemies and monsters go to monster_agent.\n\
         - Items, loot, treasure, rewards and inventory go to item_agent.\n\
         - Exploration, dialogue and story progress go to narrator_agent.\n\
         - Always hand off; only answer yourself when no agent fits.\n",
    );
    instructions
}

pub fn error_message(error: &AppError) -> Message {
    Message::new(MessageType::System, format!("{ERROR_PREFIX} {error}"))
}
