use brickfall_engine::PieceKind;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use super::style;

/// What a single glass cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Empty,
    Shadow,
    Piece(PieceKind),
}

#[derive(Debug)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub const fn width() -> u16 {
        2
    }

    pub const fn height() -> u16 {
        1
    }

    pub const fn from_block(block: Block, show_dots: bool) -> Self {
        match block {
            Block::Empty if show_dots => Self::new(style::EMPTY_DOT, "·"),
            Block::Empty => Self::new(style::EMPTY, ""),
            Block::Shadow => Self::new(style::SHADOW, "[]"),
            Block::Piece(kind) => {
                let style = match kind {
                    PieceKind::I => style::I_BLOCK,
                    PieceKind::J => style::J_BLOCK,
                    PieceKind::L => style::L_BLOCK,
                    PieceKind::O => style::O_BLOCK,
                    PieceKind::S => style::S_BLOCK,
                    PieceKind::T => style::T_BLOCK,
                    PieceKind::Z => style::Z_BLOCK,
                };
                Self::new(style, "")
            }
        }
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // A Paragraph fills the whole area, not only the cells under the symbol.
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
