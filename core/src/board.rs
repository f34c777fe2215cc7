use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use hashbrown::HashSet;
use ndarray::Array2;
use smallvec::SmallVec;

use crate::*;

/// Minesweeper grid plus the coordinate-keyed membership views the solving
/// engines reason over. All mutation after `start` flows through the
/// idempotent `open` and `flag`; tiles only ever transition covered→opened
/// or covered→flagged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    config: GameConfig,
    tiles: Array2<Tile>,
    neighbors: NeighborIndex,
    mined: BTreeSet<Coord2>,
    flagged: BTreeSet<Coord2>,
    opened: BTreeSet<Coord2>,
    started: bool,
}

impl Board {
    /// Fresh board with unset tiles. Placement and numbering happen at
    /// `start`; the configuration is checked here so a bad mine count
    /// surfaces before any play.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tiles: Array2::default(config.size.to_nd_index()),
            neighbors: NeighborIndex::new(config.size),
            mined: BTreeSet::new(),
            flagged: BTreeSet::new(),
            opened: BTreeSet::new(),
            started: false,
        })
    }

    /// Board with an explicit mine layout, already placed and numbered.
    /// No start zone is reserved, so any consistent position can be probed
    /// directly with `open`/`flag`.
    pub fn with_mines(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }

        let mut mined = BTreeSet::new();
        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mined.insert(coords);
        }

        let mut tiles: Array2<Tile> = Array2::default(size.to_nd_index());
        for &coords in &mined {
            tiles[coords.to_nd_index()].mined = true;
        }

        let mine_count: CellCount = mined.len().try_into().unwrap();
        let mut board = Self {
            config: GameConfig::new(size, mine_count),
            tiles,
            neighbors: NeighborIndex::new(size),
            mined,
            flagged: BTreeSet::new(),
            opened: BTreeSet::new(),
            started: true,
        };
        board.assign_numbers();
        Ok(board)
    }

    /// One-time transition from a fresh board into play: place mines with
    /// the given generator, number every safe tile, then open the start
    /// tile. The start tile and its whole neighborhood come out mine-free.
    pub fn start(&mut self, at: Coord2, generator: &mut impl MineGenerator) -> Result<()> {
        let at = self.validate_coords(at)?;
        if self.started {
            return Err(GameError::AlreadyStarted);
        }

        let mined = generator.generate(self.config, at, &self.neighbors)?;
        for &coords in &mined {
            self.tiles[coords.to_nd_index()].mined = true;
        }
        self.mined = mined;
        self.assign_numbers();
        self.started = true;

        self.open_at(at);
        Ok(())
    }

    /// Opens a tile. No-op on opened or flagged tiles. Opening a zero tile
    /// reveals its connected zero region and the numbered ring around it.
    pub fn open(&mut self, at: Coord2) -> Result<()> {
        let at = self.validate_coords(at)?;
        self.open_at(at);
        Ok(())
    }

    /// Flags a tile as a suspected mine. No-op on opened or flagged tiles.
    pub fn flag(&mut self, at: Coord2) -> Result<()> {
        let at = self.validate_coords(at)?;
        self.flag_at(at);
        Ok(())
    }

    pub fn tile_at(&self, at: Coord2) -> Result<Tile> {
        let at = self.validate_coords(at)?;
        Ok(self.tiles[at.to_nd_index()])
    }

    /// All tiles with their coordinates, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        self.tiles
            .indexed_iter()
            .map(|((row, col), &tile)| ((row as Coord, col as Coord), tile))
    }

    pub fn neighbors_of(&self, at: Coord2) -> Result<&[Coord2]> {
        let at = self.validate_coords(at)?;
        Ok(self.neighbors.of(at))
    }

    pub fn flag_count(&self, at: Coord2) -> Result<u8> {
        let at = self.validate_coords(at)?;
        Ok(self.flag_count_at(at))
    }

    pub fn covered_neighbors(&self, at: Coord2) -> Result<SmallVec<[Coord2; 8]>> {
        let at = self.validate_coords(at)?;
        Ok(self.covered_neighbors_at(at))
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_cells(&self) -> CellCount {
        self.config.total_cells()
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn mine_count(&self) -> CellCount {
        self.mined.len().try_into().unwrap()
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged.len().try_into().unwrap()
    }

    pub fn opened_count(&self) -> CellCount {
        self.opened.len().try_into().unwrap()
    }

    pub fn covered_count(&self) -> CellCount {
        self.total_cells() - self.opened_count() - self.flagged_count()
    }

    /// True iff the flags coincide with the mines, no mine was opened, and
    /// every safe tile is open.
    pub fn is_solved(&self) -> bool {
        self.flagged == self.mined
            && self.opened.is_disjoint(&self.mined)
            && self.opened_count() == self.total_cells() - self.mine_count()
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.config.size;
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn assign_numbers(&mut self) {
        let Self {
            tiles, neighbors, ..
        } = self;

        let (row_end, col_end) = tiles.dim();
        for row in 0..row_end {
            for col in 0..col_end {
                if tiles[[row, col]].mined {
                    continue;
                }
                let count = neighbors
                    .of((row as Coord, col as Coord))
                    .iter()
                    .filter(|&&pos| tiles[pos.to_nd_index()].mined)
                    .count();
                tiles[[row, col]].number = Some(count.try_into().unwrap());
            }
        }
    }

    pub(crate) fn open_at(&mut self, at: Coord2) -> bool {
        let tile = self.tiles[at.to_nd_index()];
        if tile.opened || tile.flagged {
            return false;
        }

        self.reveal(at);
        if tile.number == Some(0) {
            self.flood_from(at);
        }
        true
    }

    pub(crate) fn flag_at(&mut self, at: Coord2) -> bool {
        let tile = &mut self.tiles[at.to_nd_index()];
        if tile.opened || tile.flagged {
            return false;
        }
        tile.flagged = true;
        self.flagged.insert(at);
        true
    }

    fn reveal(&mut self, at: Coord2) {
        self.tiles[at.to_nd_index()].opened = true;
        self.opened.insert(at);
    }

    // Iterative breadth-first expansion of a zero region. Every coordinate
    // enters the queue at most once, so this terminates on any grid and
    // never risks the stack the recursive version would.
    fn flood_from(&mut self, at: Coord2) {
        let mut visited = BTreeSet::from([at]);
        let mut to_visit: VecDeque<Coord2> = self.covered_neighbors_at(at).into_iter().collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let tile = self.tiles[visit_coords.to_nd_index()];
            if tile.opened || tile.flagged {
                continue;
            }

            self.reveal(visit_coords);
            if tile.number == Some(0) {
                to_visit.extend(
                    self.covered_neighbors_at(visit_coords)
                        .into_iter()
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    pub(crate) fn flag_count_at(&self, at: Coord2) -> u8 {
        self.neighbors
            .of(at)
            .iter()
            .filter(|&&pos| self.tiles[pos.to_nd_index()].flagged)
            .count()
            .try_into()
            .unwrap()
    }

    /// `number` minus flagged neighbors: the mines still unaccounted for
    /// among a tile's covered neighbors. Meaningful for opened numbered
    /// tiles; negative only on inconsistently flagged boards.
    pub(crate) fn remaining_at(&self, at: Coord2) -> i16 {
        let number = self.tiles[at.to_nd_index()].number.unwrap_or(0);
        i16::from(number) - i16::from(self.flag_count_at(at))
    }

    pub(crate) fn covered_neighbors_at(&self, at: Coord2) -> SmallVec<[Coord2; 8]> {
        self.neighbors
            .of(at)
            .iter()
            .copied()
            .filter(|&pos| self.tiles[pos.to_nd_index()].is_covered())
            .collect()
    }

    /// Opened nonzero tiles that still touch at least one covered tile, in
    /// row-major scan order.
    pub(crate) fn unsolved_border(&self) -> Vec<Coord2> {
        self.tiles()
            .filter(|&(coords, tile)| {
                tile.is_border() && !self.covered_neighbors_at(coords).is_empty()
            })
            .map(|(coords, _)| coords)
            .collect()
    }

    /// Distinct covered tiles adjacent to the unsolved border, ordered by
    /// first appearance. These are the unknowns of the constraint system.
    pub(crate) fn covered_border(&self) -> Vec<Coord2> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for at in self.unsolved_border() {
            for pos in self.covered_neighbors_at(at) {
                if seen.insert(pos) {
                    result.push(pos);
                }
            }
        }
        result
    }

    pub(crate) fn all_covered(&self) -> Vec<Coord2> {
        self.tiles()
            .filter(|&(_, tile)| tile.is_covered())
            .map(|(coords, _)| coords)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_matches_single_corner_mine() {
        let board = Board::with_mines((3, 3), &[(0, 0)]).unwrap();

        let expected = [
            [None, Some(1), Some(0)],
            [Some(1), Some(1), Some(0)],
            [Some(0), Some(0), Some(0)],
        ];
        for row in 0..3u16 {
            for col in 0..3u16 {
                let tile = board.tile_at((row, col)).unwrap();
                assert_eq!(tile.number, expected[row as usize][col as usize]);
                assert_eq!(tile.mined, (row, col) == (0, 0));
            }
        }
    }

    #[test]
    fn flood_fill_reveals_zero_region_and_numbered_ring() {
        let mut board = Board::with_mines((3, 3), &[(0, 0)]).unwrap();
        board.open((2, 2)).unwrap();

        let opened: Vec<Coord2> = board
            .tiles()
            .filter(|&(_, tile)| tile.opened)
            .map(|(coords, _)| coords)
            .collect();
        assert_eq!(
            opened,
            [
                (0, 1),
                (0, 2),
                (1, 0),
                (1, 1),
                (1, 2),
                (2, 0),
                (2, 1),
                (2, 2)
            ]
        );
        assert!(!board.tile_at((0, 0)).unwrap().opened);
    }

    #[test]
    fn flood_fill_stops_at_flags() {
        let mut board = Board::with_mines((3, 3), &[(0, 0)]).unwrap();
        board.flag((2, 0)).unwrap();
        board.open((2, 2)).unwrap();

        let tile = board.tile_at((2, 0)).unwrap();
        assert!(tile.flagged);
        assert!(!tile.opened);
        assert_eq!(board.opened_count(), 7);
    }

    #[test]
    fn open_is_idempotent() {
        let mut board = Board::with_mines((3, 3), &[(0, 0)]).unwrap();
        board.open((2, 2)).unwrap();
        let snapshot = board.clone();

        board.open((2, 2)).unwrap();
        assert_eq!(board, snapshot);
    }

    #[test]
    fn flag_is_idempotent_and_skips_opened_tiles() {
        let mut board = Board::with_mines((2, 2), &[(0, 0)]).unwrap();

        board.flag((0, 0)).unwrap();
        board.flag((0, 0)).unwrap();
        assert_eq!(board.flagged_count(), 1);

        board.open((1, 1)).unwrap();
        board.flag((1, 1)).unwrap();
        assert!(!board.tile_at((1, 1)).unwrap().flagged);

        board.open((0, 0)).unwrap();
        assert!(!board.tile_at((0, 0)).unwrap().opened);
    }

    #[test]
    fn lookups_reject_out_of_bounds_coordinates() {
        let board = Board::with_mines((3, 3), &[]).unwrap();

        assert_eq!(board.tile_at((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.flag_count((0, 3)), Err(GameError::InvalidCoords));
        assert!(matches!(
            board.neighbors_of((9, 9)),
            Err(GameError::InvalidCoords)
        ));
    }

    #[test]
    fn with_mines_validates_size_and_coordinates() {
        assert_eq!(Board::with_mines((0, 3), &[]), Err(GameError::InvalidSize));
        assert_eq!(
            Board::with_mines((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn start_places_exact_mine_count_outside_the_safe_zone() {
        let config = GameConfig::new((9, 9), 10);
        let mut board = Board::new(config).unwrap();
        let mut generator = RandomMineGenerator::from_seed(42);

        board.start((4, 4), &mut generator).unwrap();

        assert_eq!(board.mine_count(), 10);
        assert!(!board.tile_at((4, 4)).unwrap().mined);
        for &pos in board.neighbors_of((4, 4)).unwrap() {
            assert!(!board.tile_at(pos).unwrap().mined);
        }
        assert_eq!(board.tile_at((4, 4)).unwrap().number, Some(0));
        assert!(board.tile_at((4, 4)).unwrap().opened);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut board = Board::new(GameConfig::new((9, 9), 10)).unwrap();
        let mut generator = RandomMineGenerator::from_seed(7);

        board.start((4, 4), &mut generator).unwrap();
        assert_eq!(
            board.start((4, 4), &mut generator),
            Err(GameError::AlreadyStarted)
        );
    }

    #[test]
    fn border_queries_track_covered_neighbors() {
        // 2x3 board, mines in the top corners, bottom row opened.
        let mut board = Board::with_mines((2, 3), &[(0, 0), (0, 2)]).unwrap();
        for col in 0..3 {
            board.open((1, col)).unwrap();
        }

        assert_eq!(board.unsolved_border(), [(1, 0), (1, 1), (1, 2)]);
        assert_eq!(board.covered_border(), [(0, 0), (0, 1), (0, 2)]);

        board.flag((0, 0)).unwrap();
        board.flag((0, 2)).unwrap();
        board.open((0, 1)).unwrap();
        assert!(board.unsolved_border().is_empty());
        assert!(board.covered_border().is_empty());
    }

    #[test]
    fn is_solved_requires_exact_flags_and_full_opening() {
        let mut board = Board::with_mines((2, 2), &[(0, 0)]).unwrap();
        assert!(!board.is_solved());

        board.flag((0, 0)).unwrap();
        board.open((0, 1)).unwrap();
        board.open((1, 0)).unwrap();
        assert!(!board.is_solved());

        board.open((1, 1)).unwrap();
        assert!(board.is_solved());
    }

    #[test]
    fn opening_a_mine_forfeits_the_win() {
        let mut board = Board::with_mines((2, 2), &[(0, 0)]).unwrap();
        board.open((0, 0)).unwrap();
        board.open((0, 1)).unwrap();
        board.open((1, 0)).unwrap();
        board.open((1, 1)).unwrap();
        board.flag((0, 0)).unwrap();

        assert!(!board.is_solved());
    }
}
