use std::iter;

use brickfall_engine::{Glass, Snapshot};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::{Block, BlockDisplay};

/// The glass with locked cells, the falling piece and its shadow.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    snapshot: &'a Snapshot,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        10 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        20 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    fn blocks(&self) -> [[Block; Glass::WIDTH]; Glass::HEIGHT] {
        let mut blocks = [[Block::Empty; Glass::WIDTH]; Glass::HEIGHT];
        for brick in self.snapshot.shadow.iter().flatten() {
            if let (Ok(x), Ok(y)) = (usize::try_from(brick.x), usize::try_from(brick.y)) {
                blocks[y][x] = Block::Shadow;
            }
        }
        for (row, cells) in iter::zip(&mut blocks, &self.snapshot.grid) {
            for (block, cell) in iter::zip(row, cells) {
                if let Some(cell) = cell {
                    *block = Block::Piece(cell.kind);
                }
            }
        }
        blocks
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..Glass::WIDTH).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..Glass::HEIGHT).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<{ Glass::HEIGHT }>(&vertical)
            .into_iter()
            .map(|row| row.layout::<{ Glass::WIDTH }>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.blocks()) {
            for (grid_cell, block) in iter::zip(grid_row, row) {
                BlockDisplay::from_block(block, true).render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use brickfall_engine::{GameSettings, MemoryStore, PieceKind, Session};

    use super::*;

    #[test]
    fn test_shadow_under_falling_piece() {
        let session = Session::new(GameSettings::default(), MemoryStore::default()).unwrap();
        let snapshot = session.snapshot(true);
        let blocks = BoardDisplay::new(&snapshot).blocks();

        let shadow_count = blocks.iter().flatten().filter(|b| **b == Block::Shadow).count();
        let piece_count = blocks
            .iter()
            .flatten()
            .filter(|b| matches!(b, Block::Piece(_)))
            .count();
        assert_eq!(shadow_count, 4);
        assert_eq!(piece_count, 4);
    }

    #[test]
    fn test_no_shadow_when_hidden() {
        let session = Session::new(GameSettings::default(), MemoryStore::default()).unwrap();
        let snapshot = session.snapshot(false);
        let blocks = BoardDisplay::new(&snapshot).blocks();
        assert!(!blocks.iter().flatten().any(|b| *b == Block::Shadow));
        let kind = session.glass().current().unwrap().kind();
        assert!(blocks.iter().flatten().any(|b| *b == Block::Piece(kind)));
        assert!(PieceKind::ALL.contains(&kind));
    }
}
