//! The per-seat player record carried inside [`crate::state::GameState`].

use crate::card::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier for a seated player, assigned once at seating time and
/// never reused within a room's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Advisory AI difficulty tag; biases the stay thresholds in the `ai` crate
/// but never changes rules-engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiDifficulty {
    Conservative,
    Moderate,
    Aggressive,
}

impl Default for AiDifficulty {
    fn default() -> Self {
        AiDifficulty::Moderate
    }
}

/// One seated player's full state, including the per-round fields that get
/// reset at the start of every round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_ai: bool,
    pub ai_difficulty: AiDifficulty,
    /// Running total across all completed rounds.
    pub score: u32,

    // Per-round fields, reset by `Player::reset_for_round`.
    pub number_cards: Vec<Card>,
    pub modifier_cards: Vec<Card>,
    pub action_cards: Vec<Card>,
    pub has_busted: bool,
    pub is_active: bool,
    pub frozen_by: Option<PlayerId>,
    pub used_second_chance_card_ids: BTreeSet<CardId>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_ai: bool, ai_difficulty: AiDifficulty) -> Self {
        Player {
            id,
            name,
            is_ai,
            ai_difficulty,
            score: 0,
            number_cards: Vec::new(),
            modifier_cards: Vec::new(),
            action_cards: Vec::new(),
            has_busted: false,
            is_active: true,
            frozen_by: None,
            used_second_chance_card_ids: BTreeSet::new(),
        }
    }

    /// Clears every per-round field ahead of a fresh `startRound`.
    pub fn reset_for_round(&mut self) {
        self.number_cards.clear();
        self.modifier_cards.clear();
        self.action_cards.clear();
        self.has_busted = false;
        self.is_active = true;
        self.frozen_by = None;
        self.used_second_chance_card_ids.clear();
    }

    /// The distinct number values currently held (invariant I1 keeps this a
    /// set in practice; callers in the engine never push a duplicate).
    pub fn unique_number_values(&self) -> Vec<u8> {
        self.number_cards
            .iter()
            .filter_map(|c| match c.kind {
                crate::card::CardKind::Number(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn has_number_value(&self, value: u8) -> bool {
        self.unique_number_values().contains(&value)
    }

    pub fn has_unused_second_chance(&self) -> bool {
        self.action_cards.iter().any(|c| {
            matches!(c.kind, crate::card::CardKind::Action(crate::card::ActionKind::SecondChance))
                && !self.used_second_chance_card_ids.contains(&c.id)
        })
    }

    /// Any SecondChance card held, used or not (the spec's redistribution
    /// rule disqualifies a target that holds *any* SecondChance, used or
    /// unused — see DESIGN.md for the open-question resolution).
    pub fn holds_any_second_chance(&self) -> bool {
        self.action_cards
            .iter()
            .any(|c| matches!(c.kind, crate::card::CardKind::Action(crate::card::ActionKind::SecondChance)))
    }

    /// Whether the player has a ×2 multiplier in their modifier cards.
    pub fn has_multiplier(&self) -> bool {
        self.modifier_cards
            .iter()
            .any(|c| matches!(c.kind, crate::card::CardKind::Modifier(crate::card::ModifierKind::Multiply)))
    }

    /// Provisional round score if the round ended right now (used for
    /// display, Freeze banking, and the AI heuristic's `S`).
    pub fn provisional_round_score(&self) -> u32 {
        if self.has_busted {
            return 0;
        }
        let base: u32 = self
            .number_cards
            .iter()
            .filter_map(|c| match c.kind {
                crate::card::CardKind::Number(v) => Some(v as u32),
                _ => None,
            })
            .sum();
        let multiplied = if self.has_multiplier() { base * 2 } else { base };
        let add_bonus: u32 = self
            .modifier_cards
            .iter()
            .filter_map(|c| match c.kind {
                crate::card::CardKind::Modifier(crate::card::ModifierKind::Add(a)) => {
                    Some(a.amount())
                }
                _ => None,
            })
            .sum();
        let flip_seven_bonus = if self.unique_number_values().len() == 7 {
            15
        } else {
            0
        };
        multiplied + add_bonus + flip_seven_bonus
    }
}
