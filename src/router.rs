use enum_dispatch::enum_dispatch;

use crate::persona::{PersonaKind, PersonaRegistry};

/// Inputs answered locally, without routing and without a model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Greeting,
    Roll,
    Event,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        let word = input
            .trim()
            .trim_end_matches(['!', '.', '?'])
            .to_lowercase();
        match word.as_str() {
            "hi" | "hello" | "hey" => Some(Command::Greeting),
            "roll" => Some(Command::Roll),
            "event" => Some(Command::Event),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The persona answers the turn itself.
    Direct(PersonaKind),
    /// The coordinator is called with one handoff per target and the model picks.
    Delegate {
        coordinator: PersonaKind,
        targets: Vec<PersonaKind>,
    },
}

#[enum_dispatch]
pub trait Router {
    fn route(&self, input: &str) -> Route;
}

#[enum_dispatch(Router)]
#[derive(Debug, Clone)]
pub enum RoutingStrategy {
    KeywordRouter,
    DelegatedRouter,
}

#[derive(Debug, Clone)]
pub struct KeywordRouter {
    // Checked in order, the first persona with a matching keyword wins.
    priorities: Vec<(PersonaKind, Vec<String>)>,
    default: PersonaKind,
}

impl KeywordRouter {
    pub const PRIORITY: [PersonaKind; 2] = [PersonaKind::Monster, PersonaKind::ItemManager];

    pub fn from_registry(registry: &PersonaRegistry) -> Self {
        let priorities = Self::PRIORITY
            .iter()
            .filter_map(|kind| registry.persona(*kind).ok())
            .map(|persona| (persona.kind(), persona.keywords().to_vec()))
            .collect();

        Self {
            priorities,
            default: PersonaKind::Narrator,
        }
    }

    /// Picks the first persona, in priority order, with a keyword anywhere in the input.
    pub fn select(&self, input: &str) -> PersonaKind {
        let lowered = input.to_lowercase();

        self.priorities
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| lowered.contains(keyword.as_str()))
            })
            .map(|(kind, _)| *kind)
            .unwrap_or(self.default)
    }
}

impl Router for KeywordRouter {
    fn route(&self, input: &str) -> Route {
        Route::Direct(self.select(input))
    }
}

#[derive(Debug, Clone)]
pub struct DelegatedRouter {
    coordinator: PersonaKind,
    targets: Vec<PersonaKind>,
}

impl DelegatedRouter {
    pub fn from_registry(registry: &PersonaRegistry) -> Self {
        Self {
            coordinator: PersonaKind::Triage,
            targets: registry.handoff_targets(),
        }
    }
}

impl Router for DelegatedRouter {
    fn route(&self, _input: &str) -> Route {
        Route::Delegate {
            coordinator: self.coordinator,
            targets: self.targets.clone(),
        }
    }
}
