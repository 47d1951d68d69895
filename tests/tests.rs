// ../tests/tests.rs
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quest_master::app::{Action, App, STILL_THINKING};
use quest_master::tui::TuiEvent;
use quest_master::dice::EVENTS;
use quest_master::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Completion client answering from a script and remembering every request.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<Completion, AIError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<Completion, AIError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AIError> {
        self.requests.lock().expect("requests lock").push(request);
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or(Err(AIError::NoMessageFound))
    }
}

fn text(reply: &str) -> Result<Completion, AIError> {
    Ok(Completion::Text(reply.to_string()))
}

fn test_settings(routing: RoutingMode) -> Settings {
    Settings {
        api_key: Some("test-key".to_string()),
        base_url: Some("http://localhost:8080/v1".to_string()),
        routing,
        ..Settings::default()
    }
}

fn game_master(
    routing: RoutingMode,
    replies: Vec<Result<Completion, AIError>>,
) -> GameMaster<ScriptedClient> {
    GameMaster::new(
        test_settings(routing),
        PersonaRegistry::standard(),
        ScriptedClient::new(replies),
    )
}

fn instructions_of(kind: PersonaKind) -> String {
    PersonaRegistry::standard()
        .persona(kind)
        .expect("registered persona")
        .instructions()
        .to_string()
}

#[test]
fn session_start_sends_the_welcome() {
    let gm = game_master(RoutingMode::Keyword, vec![]);
    let session = gm.new_session();
    let messages = gm.on_session_start(&session);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::System);
    assert!(messages[0].content.contains("Welcome to the Fantasy Adventure Game"));
}

#[tokio::test]
async fn roll_is_answered_without_the_model() {
    let gm = game_master(RoutingMode::Handoff, vec![]);
    let mut session = gm.new_session();

    let messages = gm.on_message(&mut session, "roll").await;

    assert_eq!(messages.len(), 1);
    let roll = &messages[0].content;
    let face: u8 = roll
        .strip_prefix("🎲 You rolled a ")
        .and_then(|rest| rest.strip_suffix('!'))
        .and_then(|n| n.parse().ok())
        .expect("dice format");
    assert!((1..=6).contains(&face));
    assert!(gm.client().requests().is_empty());

    assert_eq!(
        session.snapshot(),
        &[Turn::user("roll"), Turn::assistant(roll.as_str())]
    );
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test]
async fn event_and_greeting_stay_local() {
    let gm = game_master(RoutingMode::Keyword, vec![]);
    let mut session = gm.new_session();

    let event = gm.on_message(&mut session, "EVENT").await;
    assert!(EVENTS.contains(&event[0].content.as_str()));

    let greeting = gm.on_message(&mut session, "Hello!").await;
    assert_eq!(greeting[0].content, prompts::INTRO_MESSAGE);

    assert!(gm.client().requests().is_empty());
    // Greetings are not part of the story.
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn attack_is_routed_to_the_monster() {
    let gm = game_master(
        RoutingMode::Keyword,
        vec![text("The skeleton's bones scatter across the floor.")],
    );
    let mut session = gm.new_session();

    let messages = gm.on_message(&mut session, "I attack the skeleton").await;

    let requests = gm.client().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].instructions, instructions_of(PersonaKind::Monster));
    assert_eq!(requests[0].model, settings::DEFAULT_MODEL);
    assert!(requests[0].handoffs.is_empty());
    // The user turn is in place before the model is called.
    assert_eq!(requests[0].transcript, vec![Turn::user("I attack the skeleton")]);

    assert_eq!(
        messages,
        vec![Message::game(
            "Monster Master",
            "The skeleton's bones scatter across the floor."
        )]
    );
    assert_eq!(session.active_persona(), Some(PersonaKind::Monster));
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn inventory_and_story_use_their_personas() {
    let gm = game_master(
        RoutingMode::Keyword,
        vec![text("Inside: a silver ring."), text("The road bends north.")],
    );
    let mut session = gm.new_session();

    gm.on_message(&mut session, "I open the chest").await;
    gm.on_message(&mut session, "I follow the road").await;

    let requests = gm.client().requests();
    assert_eq!(
        requests[0].instructions,
        instructions_of(PersonaKind::ItemManager)
    );
    assert_eq!(
        requests[1].instructions,
        instructions_of(PersonaKind::Narrator)
    );
    // The second call sees the whole first exchange.
    assert_eq!(requests[1].transcript.len(), 3);
    assert_eq!(session.active_persona(), Some(PersonaKind::Narrator));
}

#[tokio::test]
async fn transport_error_keeps_the_session_usable() {
    let gm = game_master(
        RoutingMode::Keyword,
        vec![Err(AIError::Timeout), text("You catch your breath.")],
    );
    let mut session = gm.new_session();

    let messages = gm.on_message(&mut session, "I fight the troll").await;

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::System);
    assert!(messages[0].content.starts_with(prompts::ERROR_PREFIX));
    assert!(messages[0].content.contains("Timeout"));
    assert_eq!(session.snapshot(), &[Turn::user("I fight the troll")]);
    assert_eq!(session.state(), TurnState::Idle);

    let retry = gm.on_message(&mut session, "I rest").await;
    assert_eq!(retry[0].message_type, MessageType::Game);
    assert_eq!(session.len(), 3);
}

#[tokio::test]
async fn pending_turn_refuses_a_second_message() {
    let gm = game_master(RoutingMode::Keyword, vec![text("unused")]);
    let mut session = gm.new_session();
    session.begin_turn().expect("idle");

    let messages = gm.on_message(&mut session, "I walk on").await;

    assert!(messages[0].content.starts_with(prompts::ERROR_PREFIX));
    assert!(session.is_empty());
    assert!(gm.client().requests().is_empty());
}

#[tokio::test]
async fn pairs_accumulate_in_order() {
    let replies = (0..4).map(|i| text(&format!("answer {i}"))).collect();
    let gm = game_master(RoutingMode::Keyword, replies);
    let mut session = gm.new_session();

    for i in 0..4 {
        gm.on_message(&mut session, &format!("step {i}")).await;
    }

    let expected: Vec<Turn> = (0..4)
        .flat_map(|i| {
            [
                Turn::user(format!("step {i}")),
                Turn::assistant(format!("answer {i}")),
            ]
        })
        .collect();
    assert_eq!(session.snapshot(), expected.as_slice());
}

#[tokio::test]
async fn handoff_runs_the_chosen_persona() {
    let gm = game_master(
        RoutingMode::Handoff,
        vec![
            Ok(Completion::Handoff(PersonaKind::ItemManager)),
            text("You find a glowing potion."),
        ],
    );
    let mut session = gm.new_session();

    let messages = gm.on_message(&mut session, "What's in the crate?").await;

    let requests = gm.client().requests();
    assert_eq!(requests.len(), 2);

    let tool_names: Vec<&str> = requests[0]
        .handoffs
        .iter()
        .map(|h| h.tool_name.as_str())
        .collect();
    assert_eq!(
        tool_names,
        vec![
            "transfer_to_item_agent",
            "transfer_to_monster_agent",
            "transfer_to_narrator_agent"
        ]
    );
    assert!(requests[0]
        .instructions
        .starts_with(&instructions_of(PersonaKind::Triage)));
    assert!(requests[0].instructions.contains("transfer_to_monster_agent"));

    assert_eq!(
        requests[1].instructions,
        instructions_of(PersonaKind::ItemManager)
    );
    assert!(requests[1].handoffs.is_empty());
    assert_eq!(requests[1].transcript, requests[0].transcript);

    assert_eq!(messages[0].speaker.as_deref(), Some("Item Keeper"));
    assert_eq!(session.active_persona(), Some(PersonaKind::ItemManager));
    assert_eq!(
        session.snapshot().last(),
        Some(&Turn::assistant("You find a glowing potion."))
    );
}

#[tokio::test]
async fn coordinator_may_answer_itself() {
    let gm = game_master(
        RoutingMode::Handoff,
        vec![text("Your quest begins at the edge of the Whispering Woods.")],
    );
    let mut session = gm.new_session();

    let messages = gm.on_message(&mut session, "start").await;

    assert_eq!(messages[0].speaker.as_deref(), Some("Game Master"));
    assert_eq!(session.active_persona(), Some(PersonaKind::Triage));
    assert_eq!(gm.client().requests().len(), 1);
}

#[tokio::test]
async fn history_window_limits_the_model_context() {
    let gm = GameMaster::new(
        Settings {
            history_window: Some(2),
            ..test_settings(RoutingMode::Keyword)
        },
        PersonaRegistry::standard(),
        ScriptedClient::new(vec![text("a1"), text("a2"), text("a3")]),
    );
    let mut session = gm.new_session();

    for input in ["u1", "u2", "u3"] {
        gm.on_message(&mut session, input).await;
    }

    let requests = gm.client().requests();
    assert_eq!(requests[2].transcript, vec![Turn::user("u3")]);
    // Nothing is dropped from the stored transcript.
    assert_eq!(session.len(), 6);
}

fn type_line<C: CompletionClient + 'static>(app: &mut App<C>, line: &str) {
    for c in line.chars() {
        assert!(app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)).is_none());
    }
}

#[tokio::test]
async fn app_serialises_turns_of_its_session() {
    let gm = Arc::new(game_master(
        RoutingMode::Keyword,
        vec![text("The gate groans open.")],
    ));
    let mut app = App::new(Arc::clone(&gm));
    assert_eq!(app.game_content().len(), 1);

    type_line(&mut app, "I push the gate");
    let submit = app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert!(matches!(submit, Some(Action::Submit)));
    app.handle_action(Action::Submit);
    assert!(app.is_thinking());
    assert_eq!(app.input(), "");

    type_line(&mut app, "roll");
    app.handle_action(Action::Submit);
    assert_eq!(
        app.game_content().last().map(|m| m.content.as_str()),
        Some(STILL_THINKING)
    );
    assert_eq!(app.input(), "roll");

    app.process_next_action().await;
    assert!(!app.is_thinking());
    assert_eq!(
        app.game_content().last(),
        Some(&Message::game("Narrator", "The gate groans open."))
    );
    assert_eq!(app.session().map(ConversationSession::len), Some(2));

    let quit = app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    app.handle_action(quit.expect("quit action"));
    assert!(!app.is_running());
}

#[tokio::test]
async fn zero_history_window_still_sends_the_message() {
    let gm = GameMaster::new(
        Settings {
            history_window: Some(0),
            ..test_settings(RoutingMode::Keyword)
        },
        PersonaRegistry::standard(),
        ScriptedClient::new(vec![text("a1"), text("a2")]),
    );
    let mut session = gm.new_session();

    gm.on_message(&mut session, "I look around").await;
    gm.on_message(&mut session, "I walk north").await;

    let requests = gm.client().requests();
    assert_eq!(requests[0].transcript, vec![Turn::user("I look around")]);
    assert_eq!(requests[1].transcript, vec![Turn::user("I walk north")]);
}

#[tokio::test]
async fn pasted_lines_join_the_input() {
    let gm = Arc::new(game_master(RoutingMode::Keyword, vec![]));
    let mut app = App::new(gm);

    app.handle_tui_event(TuiEvent::Paste("open\nthe\r\ndoor".to_string()));

    // Line breaks never submit; they become spaces.
    assert_eq!(app.input(), "open the  door");
    assert!(!app.is_thinking());
}
