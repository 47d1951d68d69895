use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::PersonaError;
use crate::prompts::*;

const COMBAT_KEYWORDS: &[&str] = &[
    "attack", "fight", "battle", "combat", "strike", "slash", "stab", "shoot", "kill", "monster",
    "enemy", "dodge", "parry",
];

const INVENTORY_KEYWORDS: &[&str] = &[
    "chest",
    "loot",
    "item",
    "inventory",
    "treasure",
    "potion",
    "gold",
    "equip",
    "reward",
    "pick",
];

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum PersonaKind {
    #[strum(serialize = "narrator_agent")]
    #[serde(rename = "narrator_agent")]
    Narrator,
    #[strum(serialize = "monster_agent")]
    #[serde(rename = "monster_agent")]
    Monster,
    #[strum(serialize = "item_agent")]
    #[serde(rename = "item_agent")]
    ItemManager,
    #[strum(serialize = "triage_agent")]
    #[serde(rename = "triage_agent")]
    Triage,
}

impl PersonaKind {
    /// Name shown to the player next to the persona's answers.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaKind::Narrator => "Narrator",
            PersonaKind::Monster => "Monster Master",
            PersonaKind::ItemManager => "Item Keeper",
            PersonaKind::Triage => "Game Master",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    kind: PersonaKind,
    instructions: String,
    handoff_description: String,
    keywords: Vec<String>,
}

impl Persona {
    pub fn new(
        kind: PersonaKind,
        instructions: impl Into<String>,
        handoff_description: impl Into<String>,
        keywords: &[&str],
    ) -> Self {
        Self {
            kind,
            instructions: instructions.into(),
            handoff_description: handoff_description.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn kind(&self) -> PersonaKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.as_ref()
    }

    pub fn instructions(&self) -> &str {
        self.instructions.trim()
    }

    pub fn handoff_description(&self) -> &str {
        &self.handoff_description
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Fixed set of personas, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl PersonaRegistry {
    pub fn standard() -> Self {
        Self {
            personas: vec![
                Persona::new(
                    PersonaKind::Narrator,
                    NARRATOR_PREAMBLE,
                    NARRATOR_HANDOFF,
                    &[],
                ),
                Persona::new(
                    PersonaKind::Monster,
                    MONSTER_PREAMBLE,
                    MONSTER_HANDOFF,
                    COMBAT_KEYWORDS,
                ),
                Persona::new(
                    PersonaKind::ItemManager,
                    ITEM_PREAMBLE,
                    ITEM_HANDOFF,
                    INVENTORY_KEYWORDS,
                ),
                Persona::new(PersonaKind::Triage, TRIAGE_PREAMBLE, TRIAGE_HANDOFF, &[]),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Result<&Persona, PersonaError> {
        self.iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| PersonaError::NotFound(name.to_string()))
    }

    pub fn persona(&self, kind: PersonaKind) -> Result<&Persona, PersonaError> {
        self.iter()
            .find(|p| p.kind == kind)
            .ok_or_else(|| PersonaError::NotFound(kind.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Personas the coordinator may hand a turn to, in the order they are offered.
    pub fn handoff_targets(&self) -> Vec<PersonaKind> {
        [
            PersonaKind::ItemManager,
            PersonaKind::Monster,
            PersonaKind::Narrator,
        ]
        .into_iter()
        .filter(|kind| self.persona(*kind).is_ok())
        .collect()
    }
}
