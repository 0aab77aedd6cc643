//! Fixed timestep simulation tick
//!
//! Advances one round deterministically: player, enemies, power coin, then
//! cherry, enemy and coin contact checks, in that order.

use super::player::Controls;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held directions
    pub controls: Controls,
    /// Jump action pressed this tick (glides when airborne)
    pub jump: bool,
    /// The dance or death sequence finished playing
    pub sequence_done: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Ready => {
            state.ready_timer += dt;
            if state.ready_timer >= READY_TIME {
                state.ready_timer = 0.0;
                state.phase = GamePhase::Playing;
            }
            return;
        }
        GamePhase::Won | GamePhase::Dying => {
            if input.sequence_done {
                finish_sequence(state);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    if input.jump {
        let points = state.player.jump();
        state.add_points(points, state.player.pos);
    }

    let points = state
        .player
        .update(&input.controls, dt, state.platforms.as_slice());
    state.add_points(points, state.player.pos);

    state.enemies.update(dt, state.player.pos, &state.platforms);

    state.player.powered_up = state
        .coin
        .update(dt, state.player.powered_up, &state.platforms);

    if check_cherries(state) {
        return;
    }
    if check_enemies(state) {
        return;
    }
    check_coin(state);
}

/// Eat at most one cherry. Returns true if that cleared the round.
fn check_cherries(state: &mut GameState) -> bool {
    let Some(index) = state
        .cherries
        .touching(state.player.center(), state.player.collide_radius)
    else {
        return false;
    };

    let counting = !state.player.powered_up && !state.coin.visible;
    let Some((cherry, eaten)) = state.cherries.eat(index, counting) else {
        return false;
    };
    state.add_points(eaten.points, cherry.pos);

    if eaten.coin_ready {
        state.coin.visible = true;
        log::debug!("Power coin out at {}", state.coin.pos);
    }
    if state.cherries.is_empty() {
        win_round(state);
        return true;
    }
    false
}

/// Collect frozen enemies, die on hostile ones, then let grounded mummies
/// transform. Returns true if a life was lost.
fn check_enemies(state: &mut GameState) -> bool {
    let touched: Vec<usize> = state
        .enemies
        .active_indices()
        .iter()
        .copied()
        .filter(|&i| {
            state
                .enemies
                .get(i)
                .is_some_and(|e| state.player.touches(e.center(), e.collide_radius))
        })
        .collect();

    for index in touched {
        let Some(enemy) = state.enemies.get(index) else {
            continue;
        };
        if enemy.is_frozen() {
            let pos = enemy.center();
            let points = CAPTURE_POINTS[state.capture_index];
            state.enemies.capture(index);
            state.add_points(points, pos);
            if state.capture_index < CAPTURE_POINTS.len() - 1 {
                state.capture_index += 1;
            }
        } else if !enemy.is_friendly() {
            lose_life(state);
            return true;
        }
    }

    let ground = state.platforms.ground_index();
    let transformed = state
        .enemies
        .transform_grounded(ground, state.player.pos);
    for _ in 0..transformed {
        state.push_event(GameEvent::EnemyTransformed);
    }
    false
}

fn check_coin(state: &mut GameState) {
    if state.coin.visible
        && state
            .player
            .touches(state.coin.pos, state.coin.collide_radius)
    {
        state.coin.visible = false;
        state.coin.timer = 0.0;
        state.player.powered_up = true;
        state.capture_index = 0;
        state.enemies.freeze();
        log::debug!("Powered up");
        state.push_event(GameEvent::PoweredUp);
    }
}

/// Round-clear bonus for the lit cherries eaten this round
pub fn lit_bonus(lit_count: u32) -> u64 {
    if lit_count < LIT_BONUS_MIN {
        return 0;
    }
    // Index is `23 - lit_count`; anything above 23 takes the top entry
    let top = LIT_BONUS_MIN as usize + LIT_BONUS_TABLE.len() - 1;
    let slot = top.saturating_sub(lit_count as usize);
    LIT_BONUS_UNIT * LIT_BONUS_TABLE[slot]
}

fn win_round(state: &mut GameState) {
    state.enemies.clear();
    state.player.powered_up = false;
    state.coin.visible = false;
    state.player.start_dancing();

    state.session.round += 1;
    state.session.level = (state.session.round as usize - 1) % state.level_count();

    let bonus = lit_bonus(state.cherries.lit_count);
    state.add_points(bonus, state.player.pos);

    state.phase = GamePhase::Won;
    log::info!(
        "Round cleared with {} lit cherries, next round {}",
        state.cherries.lit_count,
        state.session.round
    );
    state.push_event(GameEvent::RoundAdvanced {
        round: state.session.round,
    });
}

fn lose_life(state: &mut GameState) {
    state.coin.visible = false;
    state.player.powered_up = false;
    state.enemies.clear();
    state.player.start_dying();
    state.session.lives = state.session.lives.saturating_sub(1);

    state.phase = GamePhase::Dying;
    log::info!("Life lost, {} left", state.session.lives);
    state.push_event(GameEvent::LifeLost {
        lives_left: state.session.lives,
    });
}

/// Leave `Won` or `Dying` once its sequence has played
fn finish_sequence(state: &mut GameState) {
    match state.phase {
        GamePhase::Won => state.start_round(true),
        GamePhase::Dying if state.session.lives > 0 => state.start_round(false),
        GamePhase::Dying => game_over(state),
        GamePhase::Ready | GamePhase::Playing => {}
    }
}

fn game_over(state: &mut GameState) {
    let score = state.session.score;
    log::info!("Game over with {} points", score);
    state.push_event(GameEvent::GameOver { score });
    if score > state.session.high_score {
        state.session.high_score = score;
        state.push_event(GameEvent::NewHighScore { score });
    }

    state.session.level = 0;
    state.session.round = 1;
    state.session.score = 0;
    state.session.lives = state.session.start_lives;
    state.start_round(true);
}
