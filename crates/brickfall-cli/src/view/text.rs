use brickfall_engine::{Cell, Shape};

/// Characters used by the plain-text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    pub brick: char,
    pub empty: char,
}

impl Charset {
    pub const BLOCKS: Self = Self {
        brick: '█',
        empty: '·',
    };
    pub const NUMBERS: Self = Self {
        brick: '1',
        empty: '0',
    };

    fn cell(self, occupied: bool) -> char {
        if occupied { self.brick } else { self.empty }
    }
}

/// Renders a grid of cells, one text line per row.
pub fn render_grid<R>(grid: &[R], charset: Charset) -> String
where
    R: AsRef<[Option<Cell>]>,
{
    let lines: Vec<String> = grid
        .iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|cell| charset.cell(cell.is_some()))
                .collect()
        })
        .collect();
    lines.join("\n")
}

/// Renders a single rotation state as tight art, `height` lines of `width` chars.
pub fn render_shape(shape: Shape, charset: Charset) -> Vec<String> {
    (0..shape.height())
        .map(|dy| {
            (0..shape.width())
                .map(|dx| charset.cell(shape.is_occupied(dx, dy)))
                .collect()
        })
        .collect()
}
