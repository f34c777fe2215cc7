use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

mod counting;
mod elimination;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    /// Every tile ended up opened or flagged.
    Won,
    /// No further deduction was possible; covered tiles remain.
    Stuck,
}

impl SolveOutcome {
    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

/// One driver-visible engine step, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceStep {
    Counting { passes: u32, changes: usize },
    Elimination { flagged: usize },
}

/// Read-only counts handed to the progress callback after each counting
/// pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub opened: CellCount,
    pub flagged: CellCount,
    pub covered: CellCount,
}

impl ProgressSnapshot {
    pub fn from_board(board: &Board) -> Self {
        Self {
            opened: board.opened_count(),
            flagged: board.flagged_count(),
            covered: board.covered_count(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub rounds: u32,
    /// Percentage of tiles no longer covered at the end of the run.
    pub exploration: f64,
    pub tiles_flagged: CellCount,
    pub total_mines: CellCount,
    pub trace: Vec<TraceStep>,
}

impl SolveReport {
    pub fn flag_accuracy(&self) -> f64 {
        if self.total_mines == 0 {
            1.0
        } else {
            f64::from(self.tiles_flagged) / f64::from(self.total_mines)
        }
    }
}

pub fn solve(board: &mut Board) -> SolveReport {
    solve_with_progress(board, |_| {})
}

/// Alternates the counting engine (run to its own fixpoint) with a single
/// elimination pass until a full round changes nothing, then reports the
/// terminal state. `on_pass` receives a count snapshot after every counting
/// pass; it never sees the grid itself.
pub fn solve_with_progress(
    board: &mut Board,
    mut on_pass: impl FnMut(ProgressSnapshot),
) -> SolveReport {
    let mut trace = Vec::new();
    let mut rounds = 0u32;

    loop {
        rounds += 1;

        let (passes, changes) = counting::run_to_fixpoint(board, &mut on_pass);
        trace.push(TraceStep::Counting { passes, changes });

        let flagged = elimination::run_once(board);
        trace.push(TraceStep::Elimination { flagged });

        log::debug!("round {rounds}: counting changed {changes}, elimination flagged {flagged}");
        if changes + flagged == 0 {
            break;
        }
    }

    let covered = board.covered_count();
    let exploration = 100.0 * (1.0 - f64::from(covered) / f64::from(board.total_cells()));
    let outcome = if covered == 0 {
        SolveOutcome::Won
    } else {
        SolveOutcome::Stuck
    };

    SolveReport {
        outcome,
        rounds,
        exploration,
        tiles_flagged: board.flagged_count(),
        total_mines: board.mine_count(),
        trace,
    }
}
