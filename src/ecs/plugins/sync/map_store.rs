use crate::ecs::core::CellId;

/// Grid code of a cell with no obstacle.
pub const EMPTY_CELL: i64 = 0;

/// Obstacle grid plus the map version agreed with the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStateStore {
    grid: Vec<Vec<i64>>,
    columns: usize,
    version: i64,
}

/// Result of applying one update's version batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedBatches {
    /// Cells that held an obstacle and are now empty.
    pub removed: Vec<CellId>,
    /// The version hit `i64::MAX` and stopped counting.
    pub saturated: bool,
}

/// A non-empty cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleCell {
    pub cell: CellId,
    pub row: usize,
    pub column: usize,
    pub code: i64,
}

impl MapStateStore {
    /// Replaces the grid. Every row must have `grid[0].len()` cells.
    pub fn initialize(&mut self, grid: Vec<Vec<i64>>, version: i64) {
        self.columns = grid.first().map(Vec::len).unwrap_or(0);
        self.grid = grid;
        self.version = version;
    }

    /// Empties the cells named by each batch in order and bumps the version
    /// once per batch, empty batches included. The version saturates at
    /// `i64::MAX` instead of wrapping.
    pub fn apply_version_batches(&mut self, batches: &[Vec<CellId>]) -> AppliedBatches {
        let mut applied = AppliedBatches::default();

        for batch in batches {
            for &cell in batch {
                if self.clear_cell(cell) {
                    applied.removed.push(cell);
                }
            }
            match self.version.checked_add(1) {
                Some(next) => self.version = next,
                None => applied.saturated = true,
            }
        }

        applied
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, cell: CellId) -> Option<i64> {
        let (row, column) = self.position(cell)?;
        Some(self.grid[row][column])
    }

    pub fn cell_id(&self, row: usize, column: usize) -> CellId {
        (row * self.columns + column) as CellId
    }

    /// Row and column of `cell`, if it lies on the grid.
    pub fn position(&self, cell: CellId) -> Option<(usize, usize)> {
        if cell < 0 || self.columns == 0 {
            return None;
        }
        let cell = cell as usize;
        let (row, column) = (cell / self.columns, cell % self.columns);
        (row < self.grid.len()).then_some((row, column))
    }

    pub fn obstacle_cells(&self) -> impl Iterator<Item = ObstacleCell> + '_ {
        self.grid.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, code)| **code != EMPTY_CELL)
                .map(move |(column, &code)| ObstacleCell {
                    cell: self.cell_id(row, column),
                    row,
                    column,
                    code,
                })
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn clear_cell(&mut self, cell: CellId) -> bool {
        let Some((row, column)) = self.position(cell) else {
            return false;
        };
        let slot = &mut self.grid[row][column];
        if *slot == EMPTY_CELL {
            return false;
        }
        *slot = EMPTY_CELL;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_grid(rows: usize, columns: usize) -> MapStateStore {
        let mut store = MapStateStore::default();
        store.initialize(vec![vec![1; columns]; rows], 0);
        store
    }

    #[test]
    fn batches_empty_cells_and_count_versions() {
        let mut store = full_grid(3, 3);

        let applied = store.apply_version_batches(&[vec![2, 5], vec![]]);

        assert_eq!(applied.removed, vec![2, 5]);
        assert!(!applied.saturated);
        assert_eq!(store.version(), 2);
        for cell in 0..9 {
            let expected = if cell == 2 || cell == 5 { EMPTY_CELL } else { 1 };
            assert_eq!(store.cell(cell), Some(expected), "cell {}", cell);
        }
    }

    #[test]
    fn version_grows_by_batch_count() {
        let mut store = full_grid(2, 2);
        store.initialize(vec![vec![1, 1], vec![1, 1]], 40);

        let batches = vec![vec![], vec![0], vec![], vec![0, 1, 1], vec![]];
        store.apply_version_batches(&batches);

        assert_eq!(store.version(), 45);
    }

    #[test]
    fn reapplying_a_batch_is_idempotent_per_cell() {
        let mut store = full_grid(2, 2);

        assert_eq!(store.apply_version_batches(&[vec![3, 3]]).removed, vec![3]);
        assert!(store.apply_version_batches(&[vec![3]]).removed.is_empty());
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn out_of_range_cells_are_ignored() {
        let mut store = full_grid(2, 2);

        assert!(store.apply_version_batches(&[vec![-1, 4, 99]]).removed.is_empty());
        assert_eq!(store.version(), 1);
        assert_eq!(store.obstacle_cells().count(), 4);
    }

    #[test]
    fn obstacle_cells_are_row_major() {
        let mut store = MapStateStore::default();
        store.initialize(vec![vec![1, 1], vec![0, 2]], 0);

        let cells: Vec<_> = store.obstacle_cells().map(|o| (o.cell, o.row, o.column, o.code)).collect();

        assert_eq!(cells, vec![(0, 0, 0, 1), (1, 0, 1, 1), (3, 1, 1, 2)]);
    }

    #[test]
    fn empty_grid_accepts_batches() {
        let mut store = MapStateStore::default();
        store.initialize(Vec::new(), 3);

        assert!(store.apply_version_batches(&[vec![0]]).removed.is_empty());
        assert_eq!(store.version(), 4);
    }

    #[test]
    fn version_saturates_instead_of_overflowing() {
        let mut store = MapStateStore::default();
        store.initialize(vec![vec![1]], i64::MAX - 1);

        let applied = store.apply_version_batches(&[vec![], vec![0], vec![]]);

        assert!(applied.saturated);
        assert_eq!(applied.removed, vec![0]);
        assert_eq!(store.version(), i64::MAX);
    }
}
