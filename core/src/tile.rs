use serde::{Deserialize, Serialize};

/// State of a single board cell. `number` stays unset until numbering runs
/// at game start, and is never assigned for mined tiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub mined: bool,
    pub flagged: bool,
    pub opened: bool,
    pub number: Option<u8>,
}

impl Tile {
    /// Neither opened nor flagged — the unknowns every deduction acts on.
    pub const fn is_covered(self) -> bool {
        !self.opened && !self.flagged
    }

    /// Opened with a nonzero number: the tile constrains its covered neighbors.
    pub const fn is_border(self) -> bool {
        match self.number {
            Some(n) => self.opened && n > 0,
            None => false,
        }
    }
}
