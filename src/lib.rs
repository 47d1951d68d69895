pub mod ai;
pub mod app;
pub mod dice;
pub mod error;
pub mod game_master;
pub mod logging;
pub mod message;
pub mod persona;
pub mod prompts;
pub mod router;
pub mod session;
pub mod settings;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use ai::{Completion, CompletionClient, CompletionRequest, HandoffTool, OpenAICompletionClient};
pub use error::{AIError, AppError, ConfigError, PersonaError};
pub use game_master::GameMaster;
pub use message::{Message, MessageType, Role, Turn};
pub use persona::{Persona, PersonaKind, PersonaRegistry};
pub use router::{Command, DelegatedRouter, KeywordRouter, Route, Router, RoutingStrategy};
pub use session::{ConversationSession, TranscriptPolicy, TurnState};
pub use settings::{ApiShape, RoutingMode, Settings};
