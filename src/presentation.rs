//! Display facts derived from battles, and plain-text rendering for them.

use std::fmt::Write;

use crate::battle::{Battle, Creature, WinnerSide};
use crate::orchestrator::{BattleState, Phase};

pub const DRAW_LABEL: &str = "Draw";

/// Banner name for the current battle. "Draw" when nothing is loaded or
/// the battle was drawn; otherwise `first` on FIRST and `second` on
/// anything else, including a battle with no outcome yet.
pub fn winner_name(battle: Option<&Battle>) -> &str {
    match battle {
        None => DRAW_LABEL,
        Some(b) => match b.winner_side {
            Some(WinnerSide::Draw) => DRAW_LABEL,
            Some(WinnerSide::First) => &b.first.name,
            _ => &b.second.name,
        },
    }
}

/// History-row winner. Anything other than SECOND yields `first`, so a
/// drawn battle lists `first` here.
pub fn winner(battle: &Battle) -> &Creature {
    if battle.winner_side == Some(WinnerSide::Second) {
        &battle.second
    } else {
        &battle.first
    }
}

/// Complement of [`winner`] under the same rule.
pub fn loser(battle: &Battle) -> &Creature {
    if battle.winner_side == Some(WinnerSide::Second) {
        &battle.first
    } else {
        &battle.second
    }
}

pub fn render_creature(creature: &Creature) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} (power {})", creature.name, creature.power);
    if !creature.types.is_empty() {
        let _ = write!(out, " [{}]", creature.types);
    }
    if !creature.image_url.is_empty() {
        let _ = write!(out, " {}", creature.image_url);
    }
    out
}

pub fn render_battle(state: &BattleState) -> String {
    let mut out = String::new();
    match state.phase {
        Phase::Loading => out.push_str("Loading Pokémons...\n"),
        Phase::Simulating => out.push_str("Simulating battle...\n"),
        _ => {}
    }
    if let Some(message) = &state.error_message {
        let _ = writeln!(out, "{}", message);
    }
    if let Some(battle) = &state.battle {
        let _ = writeln!(out, "Battle #{}", battle.id);
        let _ = writeln!(out, "  {}", render_creature(&battle.first));
        out.push_str("  vs\n");
        let _ = writeln!(out, "  {}", render_creature(&battle.second));
        if battle.is_finished() {
            if battle.winner_side == Some(WinnerSide::Draw) {
                let _ = writeln!(out, "{}", DRAW_LABEL);
            } else {
                let _ = writeln!(out, "Winner: {}", winner_name(Some(battle)));
            }
        }
    }
    out
}

pub fn render_history_row(battle: &Battle) -> String {
    let verb = if battle.winner_side == Some(WinnerSide::Draw) {
        "drew with"
    } else {
        "defeated"
    };
    let winner = winner(battle);
    let loser = loser(battle);
    let mut row = format!(
        "#{} {} ({}) {} {} ({})",
        battle.id, winner.name, winner.power, verb, loser.name, loser.power
    );
    if let Some(finished_at) = battle.finished_at {
        let _ = write!(row, " at {}", finished_at.to_rfc3339());
    }
    row
}
