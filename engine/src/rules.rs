//! The rules engine: every legal mutation of a [`GameState`] lives here, and
//! nowhere else. Every public function takes `&GameState`, works on an
//! internal clone, and only ever hands the clone back on `Ok` — an `Err`
//! leaves the caller's state completely untouched. Callers (the `server`
//! Room loop, or the REST fallback) own the actual state slot and are
//! responsible for swapping it in on success.

use crate::card::{ActionKind, CardId, CardKind};
use crate::deck::Deck;
use crate::effect::Effect;
use crate::error::EngineError;
use crate::player::PlayerId;
use crate::state::{FlipThreeFrame, GameState, GameStatus, PendingActionCard, RoundHistoryEntry};
use std::collections::BTreeMap;

/// The result of any successful engine call: the new state plus the effects
/// produced while getting there, in emission order.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub state: GameState,
    pub effects: Vec<Effect>,
}

fn ensure_playing(state: &GameState) -> Result<(), EngineError> {
    match state.game_status {
        GameStatus::Playing => Ok(()),
        GameStatus::GameEnd => Err(EngineError::GameAlreadyEnded),
        GameStatus::Waiting | GameStatus::RoundEnd => Err(EngineError::WrongPhase),
    }
}

fn ensure_unblocked(state: &GameState) -> Result<(), EngineError> {
    if state.pending_action_card.is_some() {
        return Err(EngineError::PendingActionCardBlocks);
    }
    if state.pending_flip_three_remaining.is_some() {
        return Err(EngineError::PendingFlipThreeBlocks);
    }
    Ok(())
}

/// Deals the first round of a fresh game. `state.deck` must already hold a
/// deck built by the caller via `Deck::build` (deck construction needs an
/// RNG seed, which is a server-config concern, not a rules-engine one).
pub fn start_round(state: &GameState) -> Result<EngineOutcome, EngineError> {
    if state.game_status != GameStatus::Waiting {
        return Err(EngineError::WrongPhase);
    }
    if state.deck.is_none() {
        return Err(EngineError::InvariantViolated);
    }

    let mut next = state.clone();
    let mut effects = Vec::new();
    deal_round(&mut next, &mut effects)?;
    Ok(EngineOutcome { state: next, effects })
}

/// Advances from `RoundEnd` to either a fresh round or `GameEnd`.
pub fn start_next_round(state: &GameState) -> Result<EngineOutcome, EngineError> {
    if state.game_status != GameStatus::RoundEnd {
        return Err(EngineError::WrongPhase);
    }

    let mut next = state.clone();
    let mut effects = Vec::new();

    if let Some(winner_id) = determine_game_end(&next) {
        next.game_status = GameStatus::GameEnd;
        effects.push(Effect::GameEnded { winner_id });
        return Ok(EngineOutcome { state: next, effects });
    }

    deal_round(&mut next, &mut effects)?;
    Ok(EngineOutcome { state: next, effects })
}

pub fn apply_hit(state: &GameState, player_id: PlayerId) -> Result<EngineOutcome, EngineError> {
    ensure_playing(state)?;
    ensure_unblocked(state)?;
    if state.current_player_id() != Some(player_id) {
        return Err(EngineError::NotYourTurn);
    }
    if !state.player(player_id).ok_or(EngineError::InvalidTarget)?.is_active {
        return Err(EngineError::PlayerInactive);
    }

    let mut next = state.clone();
    let mut effects = Vec::new();
    let actor_index = next.current_player_index;

    match draw_for_player(&mut next, &mut effects, player_id)? {
        DrawStepResult::Continue | DrawStepResult::Suspended => {}
        DrawStepResult::Stopped => advance_or_end_round(&mut next, &mut effects, actor_index),
    }

    Ok(EngineOutcome { state: next, effects })
}

pub fn apply_stay(state: &GameState, player_id: PlayerId) -> Result<EngineOutcome, EngineError> {
    ensure_playing(state)?;
    ensure_unblocked(state)?;
    if state.current_player_id() != Some(player_id) {
        return Err(EngineError::NotYourTurn);
    }
    if !state.player(player_id).ok_or(EngineError::InvalidTarget)?.is_active {
        return Err(EngineError::PlayerInactive);
    }

    let mut next = state.clone();
    let mut effects = Vec::new();
    let idx = next.player_index(player_id).expect("validated above");
    next.players[idx].is_active = false;
    advance_or_end_round(&mut next, &mut effects, idx);

    Ok(EngineOutcome { state: next, effects })
}

/// Resolves a pending `Freeze` or `FlipThree` card with a chosen target.
/// `target_id` is ignored for action kinds that never produce a pending
/// card (`SecondChance` resolves at draw time and never reaches here).
pub fn apply_play_action(
    state: &GameState,
    player_id: PlayerId,
    card_id: CardId,
    target_id: Option<PlayerId>,
) -> Result<EngineOutcome, EngineError> {
    if state.game_status != GameStatus::Playing {
        return Err(EngineError::WrongPhase);
    }
    let pending = state.pending_action_card.ok_or(EngineError::WrongPhase)?;
    if pending.player_id != player_id {
        return Err(EngineError::NotYourTurn);
    }
    if pending.card_id != card_id {
        return Err(EngineError::UnknownCard);
    }

    let mut next = state.clone();
    let mut effects = Vec::new();

    let acting_idx = next.player_index(player_id).ok_or(EngineError::InvalidTarget)?;
    let card_pos = next.players[acting_idx]
        .action_cards
        .iter()
        .position(|c| c.id == card_id)
        .ok_or(EngineError::UnknownCard)?;
    let card = next.players[acting_idx].action_cards.remove(card_pos);
    next.deck
        .as_mut()
        .ok_or(EngineError::InvariantViolated)?
        .discard(std::iter::once(card));
    next.pending_action_card = None;

    match pending.action_kind {
        ActionKind::Freeze => {
            let target = target_id.ok_or(EngineError::InvalidTarget)?;
            let target_idx = next.player_index(target).ok_or(EngineError::InvalidTarget)?;
            if !next.players[target_idx].is_active {
                return Err(EngineError::InvalidTarget);
            }
            next.players[target_idx].is_active = false;
            next.players[target_idx].frozen_by = Some(player_id);
            effects.push(Effect::PlayerFrozen { by: player_id, target });

            if next.flip_three_stack.is_empty() {
                let actor_index = next.current_player_index;
                advance_or_end_round(&mut next, &mut effects, actor_index);
            } else {
                drive_flip_three_stack(&mut next, &mut effects)?;
            }
        }
        ActionKind::FlipThree => {
            let target = target_id.ok_or(EngineError::InvalidTarget)?;
            let target_idx = next.player_index(target).ok_or(EngineError::InvalidTarget)?;
            if !next.players[target_idx].is_active {
                return Err(EngineError::InvalidTarget);
            }
            begin_flip_three(&mut next, &mut effects, target)?;
        }
        ActionKind::SecondChance => return Err(EngineError::InvariantViolated),
    }

    Ok(EngineOutcome { state: next, effects })
}

enum DrawStepResult {
    Continue,
    Suspended,
    Stopped,
}

/// Draws one card for `player_id` and applies its immediate effect. Shared
/// by a plain Hit and by every draw forced by a `FlipThree`.
fn draw_for_player(
    state: &mut GameState,
    effects: &mut Vec<Effect>,
    player_id: PlayerId,
) -> Result<DrawStepResult, EngineError> {
    let card = state
        .deck
        .as_mut()
        .ok_or(EngineError::InvariantViolated)?
        .draw()?;
    effects.push(Effect::CardDrawn { player_id, card });

    match card.kind {
        CardKind::Number(value) => {
            let already_has = state
                .player(player_id)
                .ok_or(EngineError::InvalidTarget)?
                .has_number_value(value);
            if already_has {
                if state.player(player_id).unwrap().has_unused_second_chance() {
                    let sc_id = state
                        .player(player_id)
                        .unwrap()
                        .action_cards
                        .iter()
                        .find(|c| {
                            matches!(c.kind, CardKind::Action(ActionKind::SecondChance))
                                && !state
                                    .player(player_id)
                                    .unwrap()
                                    .used_second_chance_card_ids
                                    .contains(&c.id)
                        })
                        .map(|c| c.id)
                        .expect("has_unused_second_chance just returned true");
                    state
                        .player_mut(player_id)
                        .unwrap()
                        .used_second_chance_card_ids
                        .insert(sc_id);
                    state.deck.as_mut().unwrap().discard(std::iter::once(card));
                    effects.push(Effect::SecondChanceConsumed { player_id, saved_value: value });
                    Ok(DrawStepResult::Continue)
                } else {
                    let idx = state.player_index(player_id).unwrap();
                    state.players[idx].has_busted = true;
                    state.players[idx].is_active = false;
                    state.deck.as_mut().unwrap().discard(std::iter::once(card));
                    effects.push(Effect::PlayerBusted { player_id });
                    Ok(DrawStepResult::Stopped)
                }
            } else {
                let idx = state.player_index(player_id).unwrap();
                state.players[idx].number_cards.push(card);
                let unique_count = state.players[idx].unique_number_values().len();
                if unique_count == 7 {
                    state.players[idx].is_active = false;
                    effects.push(Effect::Flip7Achieved { player_id });
                    Ok(DrawStepResult::Stopped)
                } else {
                    Ok(DrawStepResult::Continue)
                }
            }
        }
        CardKind::Modifier(_) => {
            state.player_mut(player_id).unwrap().modifier_cards.push(card);
            Ok(DrawStepResult::Continue)
        }
        CardKind::Action(ActionKind::SecondChance) => {
            let drawer_already_unused = state.player(player_id).unwrap().has_unused_second_chance();
            if !drawer_already_unused {
                state.player_mut(player_id).unwrap().action_cards.push(card);
            } else {
                let candidates: Vec<PlayerId> = state
                    .players
                    .iter()
                    .filter(|p| p.id != player_id && p.is_active && !p.holds_any_second_chance())
                    .map(|p| p.id)
                    .collect();
                match state.deck.as_mut().unwrap().pick_random(&candidates).copied() {
                    Some(chosen) => {
                        state.player_mut(chosen).unwrap().action_cards.push(card);
                        effects.push(Effect::SecondChanceTransferred { from: player_id, to: chosen });
                    }
                    None => {
                        state.deck.as_mut().unwrap().discard(std::iter::once(card));
                        effects.push(Effect::SecondChanceDiscarded { player_id });
                    }
                }
            }
            Ok(DrawStepResult::Continue)
        }
        CardKind::Action(action_kind @ (ActionKind::Freeze | ActionKind::FlipThree)) => {
            state.player_mut(player_id).unwrap().action_cards.push(card);
            state.pending_action_card = Some(PendingActionCard {
                player_id,
                card_id: card.id,
                action_kind,
            });
            Ok(DrawStepResult::Suspended)
        }
    }
}

/// Pushes a new `FlipThree` frame and immediately drives it (and any
/// nested cascade it triggers) as far as it can go without outside input.
fn begin_flip_three(
    state: &mut GameState,
    effects: &mut Vec<Effect>,
    target: PlayerId,
) -> Result<(), EngineError> {
    state.flip_three_stack.push(FlipThreeFrame { target, remaining: 3 });
    sync_pending_flip_three_remaining(state);
    effects.push(Effect::FlipThreeBegan { target });
    drive_flip_three_stack(state, effects)
}

/// Consumes frames off `flip_three_stack` one draw at a time. Stops and
/// returns as soon as a draw suspends on a new pending action card (the
/// frame stays on the stack so this resumes it later); otherwise keeps
/// popping finished or aborted frames until the stack is empty, then
/// resumes ordinary turn flow.
fn drive_flip_three_stack(state: &mut GameState, effects: &mut Vec<Effect>) -> Result<(), EngineError> {
    loop {
        let Some(frame) = state.flip_three_stack.last().copied() else {
            break;
        };
        if frame.remaining == 0 {
            state.flip_three_stack.pop();
            sync_pending_flip_three_remaining(state);
            continue;
        }

        state.flip_three_stack.last_mut().unwrap().remaining -= 1;
        sync_pending_flip_three_remaining(state);

        match draw_for_player(state, effects, frame.target)? {
            DrawStepResult::Continue => {}
            DrawStepResult::Stopped => {
                state.flip_three_stack.pop();
                sync_pending_flip_three_remaining(state);
            }
            DrawStepResult::Suspended => return Ok(()),
        }
    }

    if state.pending_action_card.is_none() {
        resume_turn_after_suspension(state, effects);
    }
    Ok(())
}

fn sync_pending_flip_three_remaining(state: &mut GameState) {
    state.pending_flip_three_remaining = state.flip_three_stack.last().map(|f| f.remaining);
}

/// Once every pending action and FlipThree cascade has drained, either hand
/// the turn back to the acting player (if still active) or advance it.
fn resume_turn_after_suspension(state: &mut GameState, effects: &mut Vec<Effect>) {
    let idx = state.current_player_index;
    let still_active = state.players.get(idx).map(|p| p.is_active).unwrap_or(false);
    if !still_active {
        advance_or_end_round(state, effects, idx);
    }
}

/// Finds the next active seat strictly after `from_index`, wrapping around.
/// If `from_index` itself is the only active seat left, it is returned.
fn next_active_index_from(state: &GameState, from_index: usize) -> Option<usize> {
    let n = state.players.len();
    if n == 0 {
        return None;
    }
    (1..=n)
        .map(|step| (from_index + step) % n)
        .find(|&idx| state.players[idx].is_active)
}

fn advance_or_end_round(state: &mut GameState, effects: &mut Vec<Effect>, from_index: usize) {
    match next_active_index_from(state, from_index) {
        Some(idx) => state.current_player_index = idx,
        None => end_round(state, effects),
    }
}

fn end_round(state: &mut GameState, effects: &mut Vec<Effect>) {
    state.game_status = GameStatus::RoundEnd;

    let mut scores = BTreeMap::new();
    let mut busted = BTreeMap::new();
    let mut best: Option<(PlayerId, u32)> = None;
    for p in state.players.iter_mut() {
        let round_score = p.provisional_round_score();
        scores.insert(p.id, round_score);
        busted.insert(p.id, p.has_busted);
        p.score += round_score;
        if best.map(|(_, s)| round_score > s).unwrap_or(true) {
            best = Some((p.id, round_score));
        }
    }

    if let Some((player_id, score)) = best {
        let improves = state.largest_round.map(|lr| score > lr.score).unwrap_or(score > 0);
        if improves {
            state.largest_round = Some(crate::state::LargestRound { player_id, score });
        }
    }

    state.round_scores = scores.clone();
    state.round_history.push(RoundHistoryEntry { round: state.round, scores, busted });
    effects.push(Effect::RoundEnded);
}

/// The winner is the first seat (by seating order) whose total has reached
/// `target_score`; ties at the triggering round go to whoever sits first.
fn determine_game_end(state: &GameState) -> Option<PlayerId> {
    if !state.players.iter().any(|p| p.score >= state.target_score) {
        return None;
    }
    let mut best: Option<&crate::player::Player> = None;
    for p in &state.players {
        let beats_best = best.map(|b| p.score > b.score).unwrap_or(true);
        if beats_best {
            best = Some(p);
        }
    }
    best.map(|p| p.id)
}

/// Shared by `start_round` and `start_next_round`: discards every player's
/// held cards from the prior round (card-conservation requires this happen
/// exactly once, here, rather than at `RoundEnd`, so clients still see the
/// final hands while `RoundEnd` is being displayed), rotates the dealer,
/// and deals one `Number` card to each player starting left of the dealer.
fn deal_round(state: &mut GameState, effects: &mut Vec<Effect>) -> Result<(), EngineError> {
    let mut to_discard = Vec::new();
    for p in state.players.iter_mut() {
        to_discard.append(&mut p.number_cards);
        to_discard.append(&mut p.modifier_cards);
        to_discard.append(&mut p.action_cards);
        p.reset_for_round();
    }
    if !to_discard.is_empty() {
        state
            .deck
            .as_mut()
            .ok_or(EngineError::InvariantViolated)?
            .discard(to_discard);
    }

    state.round += 1;
    let seats = state.players.len();
    if seats == 0 {
        return Err(EngineError::InvariantViolated);
    }
    state.dealer_index = (state.dealer_index + 1) % seats;
    state.round_scores.clear();
    state.pending_action_card = None;
    state.pending_flip_three_remaining = None;
    state.flip_three_stack.clear();
    state.game_status = GameStatus::Playing;

    let start_index = (state.dealer_index + 1) % seats;
    state.current_player_index = start_index;

    for i in 0..seats {
        let idx = (start_index + i) % seats;
        let player_id = state.players[idx].id;
        loop {
            let deck = state.deck.as_mut().ok_or(EngineError::InvariantViolated)?;
            let card = deck.draw()?;
            if card.is_number() {
                state.players[idx].number_cards.push(card);
                effects.push(Effect::CardDrawn { player_id, card });
                break;
            } else {
                deck.return_to_bottom(card);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{AiDifficulty, Player};

    fn seat(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(PlayerId(i as u32), format!("p{i}"), false, AiDifficulty::Moderate))
            .collect()
    }

    fn fresh_game(n: usize, seed: u64) -> GameState {
        let mut state = GameState::new(seat(n), 200);
        state.deck = Some(Deck::build(n, seed));
        state
    }

    #[test]
    fn start_round_deals_one_number_card_each() {
        let state = fresh_game(3, 1);
        let outcome = start_round(&state).unwrap();
        assert_eq!(outcome.state.game_status, GameStatus::Playing);
        for p in &outcome.state.players {
            assert_eq!(p.number_cards.len(), 1);
            assert!(p.is_active);
        }
        // play begins to the left of the dealer
        let expected_start = (outcome.state.dealer_index + 1) % 3;
        assert_eq!(outcome.state.current_player_index, expected_start);
    }

    #[test]
    fn hit_not_your_turn_leaves_state_untouched() {
        let state = start_round(&fresh_game(3, 2)).unwrap().state;
        let other = state
            .players
            .iter()
            .find(|p| p.id != state.current_player_id().unwrap())
            .unwrap()
            .id;
        let err = apply_hit(&state, other).unwrap_err();
        assert_eq!(err, EngineError::NotYourTurn);
    }

    #[test]
    fn stay_banks_score_and_advances_turn() {
        let state = start_round(&fresh_game(2, 3)).unwrap().state;
        let actor = state.current_player_id().unwrap();
        let outcome = apply_stay(&state, actor).unwrap();
        assert!(!outcome.state.player(actor).unwrap().is_active);
        // with two players, the only other active seat becomes current
        assert_ne!(outcome.state.current_player_id(), Some(actor));
    }

    #[test]
    fn second_number_without_second_chance_busts() {
        let mut state = start_round(&fresh_game(2, 5)).unwrap().state;
        let actor = state.current_player_id().unwrap();
        let existing_value = match state.player(actor).unwrap().number_cards[0].kind {
            CardKind::Number(v) => v,
            _ => unreachable!(),
        };
        let dup_id = state.deck.as_mut().unwrap().next_card_id();
        let dup_card = crate::card::Card::new(dup_id, CardKind::Number(existing_value));
        state.deck.as_mut().unwrap().push_top_for_test(dup_card);

        let mut effects = Vec::new();
        let result = draw_for_player(&mut state, &mut effects, actor).unwrap();
        assert!(matches!(result, DrawStepResult::Stopped));
        assert!(state.player(actor).unwrap().has_busted);
        assert!(!state.player(actor).unwrap().is_active);
        assert!(matches!(effects.last(), Some(Effect::PlayerBusted { player_id }) if *player_id == actor));
    }

    #[test]
    fn second_chance_saves_a_duplicate_draw() {
        let mut state = start_round(&fresh_game(2, 5)).unwrap().state;
        let actor = state.current_player_id().unwrap();
        let existing_value = match state.player(actor).unwrap().number_cards[0].kind {
            CardKind::Number(v) => v,
            _ => unreachable!(),
        };
        let idx = state.player_index(actor).unwrap();
        let sc_id = state.deck.as_mut().unwrap().next_card_id();
        state.players[idx]
            .action_cards
            .push(crate::card::Card::new(sc_id, CardKind::Action(ActionKind::SecondChance)));

        let dup_id = state.deck.as_mut().unwrap().next_card_id();
        let dup_card = crate::card::Card::new(dup_id, CardKind::Number(existing_value));
        state.deck.as_mut().unwrap().push_top_for_test(dup_card);

        let mut effects = Vec::new();
        let result = draw_for_player(&mut state, &mut effects, actor).unwrap();
        assert!(matches!(result, DrawStepResult::Continue));
        assert!(!state.player(actor).unwrap().has_busted);
        assert!(state.player(actor).unwrap().is_active);
        assert!(state.player(actor).unwrap().used_second_chance_card_ids.contains(&sc_id));
    }

    #[test]
    fn freeze_self_banks_and_advances_like_stay() {
        let mut state = start_round(&fresh_game(3, 9)).unwrap().state;
        let actor = state.current_player_id().unwrap();
        let idx = state.player_index(actor).unwrap();
        let card = crate::card::Card::new(5000, CardKind::Action(ActionKind::Freeze));
        state.players[idx].action_cards.push(card);
        state.pending_action_card = Some(PendingActionCard {
            player_id: actor,
            card_id: card.id,
            action_kind: ActionKind::Freeze,
        });

        let outcome = apply_play_action(&state, actor, card.id, Some(actor)).unwrap();
        assert!(!outcome.state.player(actor).unwrap().is_active);
        assert_eq!(outcome.state.player(actor).unwrap().frozen_by, Some(actor));
        assert_ne!(outcome.state.current_player_id(), Some(actor));
    }

    #[test]
    fn flip_three_draws_three_cards_for_target() {
        let mut state = start_round(&fresh_game(3, 11)).unwrap().state;
        let actor = state.current_player_id().unwrap();
        let target = state.players.iter().find(|p| p.id != actor).unwrap().id;
        let idx = state.player_index(actor).unwrap();
        let card = crate::card::Card::new(6000, CardKind::Action(ActionKind::FlipThree));
        state.players[idx].action_cards.push(card);
        state.pending_action_card = Some(PendingActionCard {
            player_id: actor,
            card_id: card.id,
            action_kind: ActionKind::FlipThree,
        });

        let before = state.player(target).unwrap().number_cards.len()
            + state.player(target).unwrap().modifier_cards.len()
            + state.player(target).unwrap().action_cards.len();

        let outcome = apply_play_action(&state, actor, card.id, Some(target)).unwrap();

        let after = outcome.state.player(target).unwrap().number_cards.len()
            + outcome.state.player(target).unwrap().modifier_cards.len()
            + outcome.state.player(target).unwrap().action_cards.len();

        // target drew up to 3 cards unless they busted/flip-sevened early or a
        // nested action card paused the cascade.
        assert!(after > before);
        assert!(after - before <= 3);
        if outcome.state.pending_action_card.is_none() {
            assert!(outcome.state.pending_flip_three_remaining.is_none());
        }
    }

    #[test]
    fn round_end_sums_scores_and_clears_to_round_end_status() {
        let state = start_round(&fresh_game(2, 13)).unwrap().state;
        let a = state.players[0].id;
        let b = state.players[1].id;
        let s1 = apply_stay(&state, state.current_player_id().unwrap()).unwrap();
        let s2 = apply_stay(&s1.state, s1.state.current_player_id().unwrap()).unwrap();
        assert_eq!(s2.state.game_status, GameStatus::RoundEnd);
        assert!(s2.state.round_scores.contains_key(&a));
        assert!(s2.state.round_scores.contains_key(&b));
    }

    #[test]
    fn next_round_rotates_dealer_and_resets_hands() {
        let state = start_round(&fresh_game(2, 17)).unwrap().state;
        let s1 = apply_stay(&state, state.current_player_id().unwrap()).unwrap();
        let s2 = apply_stay(&s1.state, s1.state.current_player_id().unwrap()).unwrap();
        let prior_dealer = s2.state.dealer_index;
        let outcome = start_next_round(&s2.state).unwrap();
        assert_eq!(outcome.state.dealer_index, (prior_dealer + 1) % 2);
        for p in &outcome.state.players {
            assert_eq!(p.number_cards.len(), 1);
            assert!(!p.has_busted);
        }
    }

    #[test]
    fn game_ends_when_target_score_reached() {
        let mut state = fresh_game(2, 19);
        state.game_status = GameStatus::RoundEnd;
        state.players[0].score = 250;
        state.players[1].score = 100;
        let outcome = start_next_round(&state).unwrap();
        assert_eq!(outcome.state.game_status, GameStatus::GameEnd);
        assert!(matches!(outcome.effects.last(), Some(Effect::GameEnded { winner_id }) if *winner_id == state.players[0].id));
    }

    #[test]
    fn errors_never_mutate_the_original_state() {
        let state = start_round(&fresh_game(2, 23)).unwrap().state;
        let inactive = state
            .players
            .iter()
            .find(|p| p.id != state.current_player_id().unwrap())
            .unwrap()
            .id;
        let before = state.players.len();
        let _ = apply_hit(&state, inactive);
        assert_eq!(state.players.len(), before);
        assert_eq!(state.current_player_id(), state.current_player_id());
    }
}
