//! Round driver: throws dice, asks the player for keeps and a row, writes the sheet.
//!
//! This is the single place that mutates a `Scoresheet` during play.

use std::error::Error as StdError;

use log::{debug, trace};
use serde::Serialize;
use thiserror::Error;

use crate::category::{Category, NUM_CATS};
use crate::chance::DiceSource;
use crate::dice::{DiceError, Keep, Throw, NUM_DICE};
use crate::scoring::realized_points;
use crate::sheet::{Scoresheet, SheetError};

/// Boxed failure reported by a player implementation.
pub type PlayerError = Box<dyn StdError + Send + Sync + 'static>;

/// A decision policy driven by [`play_round`].
///
/// Players must not mutate game state; they only see the sheet.
pub trait Player {
    fn name(&self) -> String;

    /// Dice to set aside before the next throw.
    fn lock_dice(&mut self, sheet: &Scoresheet, throw: Throw, is_first_lock: bool) -> Keep;

    /// Row to fill with the final throw.
    fn choose_row(&mut self, sheet: &Scoresheet, throw: Throw) -> Result<Category, PlayerError>;

    /// Hook called once the game is over (diagnostics only).
    fn on_game_end(&mut self, _sheet: &Scoresheet) {}
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn lock_dice(&mut self, sheet: &Scoresheet, throw: Throw, is_first_lock: bool) -> Keep {
        (**self).lock_dice(sheet, throw, is_first_lock)
    }

    fn choose_row(&mut self, sheet: &Scoresheet, throw: Throw) -> Result<Category, PlayerError> {
        (**self).choose_row(sheet, throw)
    }

    fn on_game_end(&mut self, sheet: &Scoresheet) {
        (**self).on_game_end(sheet)
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("round {round}: {source}")]
    InvalidKeep {
        round: u8,
        #[source]
        source: DiceError,
    },
    #[error("round {round}: player chose row {row}, which is not open")]
    IllegalRow { round: u8, row: Category },
    #[error("round {round}: player failed: {source}")]
    Player {
        round: u8,
        #[source]
        source: PlayerError,
    },
    #[error("round {round}: {source}")]
    Sheet {
        round: u8,
        #[source]
        source: SheetError,
    },
    #[error("round {round}: reached {phase:?} out of order")]
    OutOfPhase { round: u8, phase: RoundPhase },
    #[error("game did not finish within {0} rounds")]
    RoundLimit(usize),
}

/// Position within one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingFirstThrow,
    AwaitingFirstLock,
    AwaitingSecondThrow,
    AwaitingSecondLock,
    AwaitingFinalThrow,
    AwaitingRowChoice,
    RoundComplete,
}

impl RoundPhase {
    /// Next phase; `RoundComplete` is terminal.
    pub fn next(self) -> RoundPhase {
        use RoundPhase::*;
        match self {
            AwaitingFirstThrow => AwaitingFirstLock,
            AwaitingFirstLock => AwaitingSecondThrow,
            AwaitingSecondThrow => AwaitingSecondLock,
            AwaitingSecondLock => AwaitingFinalThrow,
            AwaitingFinalThrow => AwaitingRowChoice,
            AwaitingRowChoice => RoundComplete,
            RoundComplete => RoundComplete,
        }
    }

    /// Index of the throw produced in this phase, if it is a throw phase.
    fn roll_idx(self) -> Option<u8> {
        match self {
            RoundPhase::AwaitingFirstThrow => Some(0),
            RoundPhase::AwaitingSecondThrow => Some(1),
            RoundPhase::AwaitingFinalThrow => Some(2),
            _ => None,
        }
    }
}

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    pub round: u8,
    pub throws: Vec<[u8; NUM_DICE]>,
    pub keeps: Vec<Vec<u8>>,
    pub row: Category,
    pub points: u32,
    /// Bonus value if this round settled it.
    pub bonus: Option<u8>,
}

/// Final sheet and per-round history of one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub player: String,
    pub sheet: Scoresheet,
    pub total: u32,
    pub rounds: Vec<RoundRecord>,
}

/// Play one round: three throws, two locks, one row choice, then the bonus rule.
pub fn play_round<P: Player + ?Sized>(
    sheet: &mut Scoresheet,
    player: &mut P,
    dice: &mut DiceSource,
    round: u8,
) -> Result<RoundRecord, GameError> {
    let mut phase = RoundPhase::AwaitingFirstThrow;
    let mut keep = Keep::EMPTY;
    let mut throw: Option<Throw> = None;
    let mut throws = Vec::with_capacity(3);
    let mut keeps = Vec::with_capacity(2);
    let mut row = None;

    while phase != RoundPhase::RoundComplete {
        match phase {
            RoundPhase::AwaitingFirstThrow
            | RoundPhase::AwaitingSecondThrow
            | RoundPhase::AwaitingFinalThrow => {
                let roll_idx = phase.roll_idx().unwrap_or_default();
                let rolled = dice.roll(keep.to_roll(), round, roll_idx);
                let t = Throw::from_parts(keep.as_slice(), &rolled);
                trace!("round {round} throw {roll_idx}: kept {keep} rolled {rolled:?} -> {t}");
                throws.push(t.dice());
                throw = Some(t);
            }
            RoundPhase::AwaitingFirstLock | RoundPhase::AwaitingSecondLock => {
                let t = throw.ok_or(GameError::OutOfPhase { round, phase })?;
                let first = phase == RoundPhase::AwaitingFirstLock;
                keep = player.lock_dice(sheet, t, first);
                keep.check_subset(&t)
                    .map_err(|source| GameError::InvalidKeep { round, source })?;
                debug!("round {round}: {t} keep {keep}");
                keeps.push(keep.as_slice().to_vec());
            }
            RoundPhase::AwaitingRowChoice => {
                let t = throw.ok_or(GameError::OutOfPhase { round, phase })?;
                let chosen = player
                    .choose_row(sheet, t)
                    .map_err(|source| GameError::Player { round, source })?;
                if !chosen.is_choosable() || sheet.is_filled(chosen) {
                    return Err(GameError::IllegalRow { round, row: chosen });
                }
                row = Some(chosen);
            }
            RoundPhase::RoundComplete => {}
        }
        phase = phase.next();
    }

    let (t, row) = throw.zip(row).ok_or(GameError::OutOfPhase { round, phase })?;
    let points = realized_points(sheet, t, row);
    sheet
        .fill(row, points)
        .map_err(|source| GameError::Sheet { round, source })?;
    let bonus = sheet.settle_bonus();
    debug!("round {round}: {t} -> {row} = {points}");
    if let Some(b) = bonus {
        debug!("round {round}: bonus settled at {b}");
    }

    Ok(RoundRecord {
        round,
        throws,
        keeps,
        row,
        points,
        bonus,
    })
}

/// Play rounds on a fresh sheet until every choosable row is filled.
pub fn play_game<P: Player + ?Sized>(
    player: &mut P,
    dice: &mut DiceSource,
) -> Result<GameRecord, GameError> {
    let mut sheet = Scoresheet::new();
    let mut rounds = Vec::with_capacity(NUM_CATS - 1);
    let limit = NUM_CATS - 1;

    while !sheet.is_complete() {
        if rounds.len() >= limit {
            return Err(GameError::RoundLimit(limit));
        }
        let round = rounds.len() as u8;
        rounds.push(play_round(&mut sheet, player, dice, round)?);
    }

    player.on_game_end(&sheet);
    Ok(GameRecord {
        player: player.name(),
        total: sheet.total(),
        sheet,
        rounds,
    })
}
