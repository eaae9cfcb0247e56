//! The card model. Cards are immutable values with a stable id assigned at
//! deck construction; nothing past `build_deck` ever mutates a [`Card`].

use serde::{Deserialize, Serialize};

/// A unique, stable identifier for one physical card within a deck.
///
/// Ids are assigned fresh by [`crate::deck::build_deck`] and are only
/// meaningful within the deck that produced them.
pub type CardId = u32;

/// The additive value carried by an `Add` modifier card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddValue {
    Plus2,
    Plus4,
    Plus6,
    Plus8,
    Plus10,
}

impl AddValue {
    /// All `Add` variants, in the order three-copies-each are minted.
    pub const ALL: [AddValue; 5] = [
        AddValue::Plus2,
        AddValue::Plus4,
        AddValue::Plus6,
        AddValue::Plus8,
        AddValue::Plus10,
    ];

    /// The numeric amount this modifier adds to a round score.
    pub fn amount(self) -> u32 {
        match self {
            AddValue::Plus2 => 2,
            AddValue::Plus4 => 4,
            AddValue::Plus6 => 6,
            AddValue::Plus8 => 8,
            AddValue::Plus10 => 10,
        }
    }
}

/// The kind of `Modifier` card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    Add(AddValue),
    /// The single ×2 multiplier.
    Multiply,
}

/// The kind of `Action` card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Freeze,
    FlipThree,
    SecondChance,
}

impl ActionKind {
    /// All action kinds, three copies of each are minted per base deck.
    pub const ALL: [ActionKind; 3] = [
        ActionKind::Freeze,
        ActionKind::FlipThree,
        ActionKind::SecondChance,
    ];
}

/// The tagged variant every card in the game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// A number card with a value in `0..=12`.
    Number(u8),
    Modifier(ModifierKind),
    Action(ActionKind),
}

/// A single physical card: its kind plus the stable id assigned at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: CardId, kind: CardKind) -> Self {
        Card { id, kind }
    }

    /// Convenience check used throughout the rules engine.
    pub fn is_number(&self) -> bool {
        matches!(self.kind, CardKind::Number(_))
    }
}
