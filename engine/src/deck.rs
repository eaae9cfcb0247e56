//! The draw pile / discard pile pair and the pure functions that operate on
//! it. A `Deck` owns its own RNG state; it is never shared between decks or
//! rooms (see the concurrency notes in the top-level spec).

use crate::card::{ActionKind, AddValue, Card, CardId, CardKind, ModifierKind};
use crate::error::EngineError;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The draw pile and discard pile for one running game.
///
/// Serializable so the REST fallback (spec.md §6) can round-trip a complete
/// `GameState`, including deck order, through a stateless client; the
/// websocket path never sends this type directly — it sends the redacted
/// `protocol` snapshot instead (see `protocol::GameStateView`).
#[derive(Clone, Serialize, Deserialize)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    rng: ChaCha8Rng,
    next_card_id: CardId,
}

impl Deck {
    /// Builds a fresh, shuffled deck sized for `player_count` seated players.
    ///
    /// The deck is composed of `ceil(player_count / 10)` base decks
    /// concatenated together. `seed` comes from `RNG_SEED` at the server
    /// boundary, or is sampled from OS entropy when unset; either way the
    /// resulting sequence of draws is fully determined by it.
    pub fn build(player_count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base_decks = player_count.div_ceil(10).max(1);

        let mut next_card_id: CardId = 0;
        let mut cards = Vec::new();
        for _ in 0..base_decks {
            push_base_deck(&mut cards, &mut next_card_id);
        }
        cards.shuffle(&mut rng);

        Deck {
            draw_pile: cards,
            discard_pile: Vec::new(),
            rng,
            next_card_id,
        }
    }

    /// Pops the top card of the draw pile, reshuffling the discard pile into
    /// a fresh draw pile first if necessary.
    pub fn draw(&mut self) -> Result<Card, EngineError> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return Err(EngineError::DeckExhausted);
            }
            self.reshuffle_discard_into_draw();
        }
        // Unwrap is safe: we just ensured the draw pile is non-empty, or
        // returned DeckExhausted above.
        Ok(self.draw_pile.pop().expect("draw pile non-empty"))
    }

    /// Appends cards to the discard pile.
    pub fn discard(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discard_pile.extend(cards);
    }

    /// Slides a card back under the draw pile. Used while dealing the
    /// initial round hand, which skips non-`Number` draws rather than
    /// resolving them.
    pub fn return_to_bottom(&mut self, card: Card) {
        self.draw_pile.insert(0, card);
    }

    fn reshuffle_discard_into_draw(&mut self) {
        std::mem::swap(&mut self.draw_pile, &mut self.discard_pile);
        self.draw_pile.shuffle(&mut self.rng);
    }

    /// The number of cards remaining in the draw pile.
    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    /// The number of cards currently in the discard pile.
    pub fn discarded(&self) -> usize {
        self.discard_pile.len()
    }

    /// Total cards held by deck + discard (used by card-conservation checks
    /// and by the AI's bust-probability estimate, which only has visibility
    /// into the undrawn cards).
    pub fn total_undrawn(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    /// Counts, among cards still in the draw pile, how many are `Number`
    /// cards whose value is in `held_values`. Used by the AI heuristic's
    /// bust-probability estimate; it intentionally ignores the discard pile
    /// since a real player cannot see it either.
    pub fn draw_pile_number_matches(&self, held_values: &[u8]) -> usize {
        self.draw_pile
            .iter()
            .filter(|c| matches!(c.kind, CardKind::Number(v) if held_values.contains(&v)))
            .count()
    }

    /// Picks one uniformly random entry out of `candidates` using the
    /// deck's own RNG, used by SecondChance redistribution. Returns `None`
    /// if `candidates` is empty.
    pub fn pick_random<'a, T>(&mut self, candidates: &'a [T]) -> Option<&'a T> {
        candidates.choose(&mut self.rng)
    }

    /// Returns the next fresh card id without consuming one (used by callers
    /// that need to mint a card outside of `build`, which does not happen in
    /// normal play but is exposed for test fixtures).
    #[cfg(test)]
    pub(crate) fn next_card_id(&mut self) -> CardId {
        let id = self.next_card_id;
        self.next_card_id += 1;
        id
    }

    /// Forces `card` to be the next draw. Test-only: production code never
    /// gets to pick what it draws.
    #[cfg(test)]
    pub(crate) fn push_top_for_test(&mut self, card: Card) {
        self.draw_pile.push(card);
    }
}

/// Appends one base deck's worth of cards (minus shuffling) to `cards`,
/// minting fresh ids starting from `*next_id`.
fn push_base_deck(cards: &mut Vec<Card>, next_id: &mut CardId) {
    let mut mint = |kind: CardKind, count: usize, cards: &mut Vec<Card>| {
        for _ in 0..count {
            cards.push(Card::new(*next_id, kind));
            *next_id += 1;
        }
    };

    // Number cards: one copy of 0, `n` copies of each value n in 1..=12.
    mint(CardKind::Number(0), 1, cards);
    for value in 1..=12u8 {
        mint(CardKind::Number(value), value as usize, cards);
    }

    // Modifiers: three copies of each Add value, exactly one Multiply(x2).
    for add in AddValue::ALL {
        mint(CardKind::Modifier(ModifierKind::Add(add)), 3, cards);
    }
    mint(CardKind::Modifier(ModifierKind::Multiply), 1, cards);

    // Actions: three copies of each.
    for action in ActionKind::ALL {
        mint(CardKind::Action(action), 3, cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_cards_per_base_deck() -> usize {
        // 1 zero + (1+2+...+12) numbers + 5*3 add modifiers + 1 multiply + 3*3 actions
        let numbers = 1 + (1..=12u32).sum::<u32>() as usize;
        let modifiers = 5 * 3 + 1;
        let actions = 3 * 3;
        numbers + modifiers + actions
    }

    #[test]
    fn build_deck_sizes_by_player_count() {
        let one_base = Deck::build(4, 42);
        assert_eq!(one_base.total_undrawn(), total_cards_per_base_deck());

        let two_base = Deck::build(11, 42);
        assert_eq!(two_base.total_undrawn(), total_cards_per_base_deck() * 2);

        let two_base_exact = Deck::build(10, 42);
        assert_eq!(
            two_base_exact.total_undrawn(),
            total_cards_per_base_deck()
        );
    }

    #[test]
    fn determinism_given_seed() {
        let mut a = Deck::build(4, 7);
        let mut b = Deck::build(4, 7);
        for _ in 0..20 {
            assert_eq!(a.draw().unwrap().id, b.draw().unwrap().id);
        }
    }

    #[test]
    fn reshuffles_discard_when_draw_pile_empty() {
        let mut deck = Deck::build(4, 1);
        let total = deck.total_undrawn();
        let mut drawn = Vec::new();
        for _ in 0..total {
            drawn.push(deck.draw().unwrap());
        }
        assert_eq!(deck.remaining(), 0);
        assert!(matches!(deck.draw(), Err(EngineError::DeckExhausted)));

        deck.discard(drawn);
        assert!(deck.draw().is_ok());
    }
}
