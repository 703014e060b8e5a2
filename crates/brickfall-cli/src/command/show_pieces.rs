use anyhow::bail;
use brickfall_engine::{Cell, Glass, Piece, PieceKind};
use serde::Serialize;

use crate::{
    util,
    view::text::{self, Charset},
};

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum CharsetArg {
    #[default]
    Blocks,
    Numbers,
}

impl From<CharsetArg> for Charset {
    fn from(arg: CharsetArg) -> Self {
        match arg {
            CharsetArg::Blocks => Self::BLOCKS,
            CharsetArg::Numbers => Self::NUMBERS,
        }
    }
}

#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct ShowPiecesArg {
    /// Characters used for bricks and empty cells
    #[clap(long, value_enum, default_value_t)]
    charset: CharsetArg,
    /// Print the showcase glass as JSON instead of text
    #[clap(long)]
    json: bool,
}

/// Every rotation of every kind, laid out on one glass without overlaps.
const SHOWCASE: &[(PieceKind, usize, i32, i32)] = &[
    (PieceKind::J, 0, 0, 2),
    (PieceKind::J, 1, 2, 5),
    (PieceKind::J, 2, 0, 0),
    (PieceKind::J, 3, 0, 5),
    (PieceKind::I, 0, 4, 0),
    (PieceKind::I, 1, 0, 9),
    (PieceKind::L, 0, 6, 0),
    (PieceKind::L, 1, 5, 5),
    (PieceKind::L, 2, 6, 2),
    (PieceKind::L, 3, 7, 5),
    (PieceKind::T, 0, 13, 2),
    (PieceKind::T, 1, 11, 0),
    (PieceKind::T, 2, 10, 2),
    (PieceKind::T, 3, 11, 5),
    (PieceKind::O, 0, 10, 8),
    (PieceKind::Z, 0, 18, 6),
    (PieceKind::Z, 1, 16, 0),
    (PieceKind::S, 0, 15, 6),
    (PieceKind::S, 1, 16, 3),
];

#[derive(Debug, Serialize)]
struct Showcase {
    pieces: Vec<Piece>,
    grid: [[Option<Cell>; Glass::WIDTH]; Glass::HEIGHT],
}

fn showcase() -> anyhow::Result<Showcase> {
    let mut glass = Glass::new();
    let mut pieces = Vec::with_capacity(SHOWCASE.len());
    for &(kind, state, top, left) in SHOWCASE {
        let piece = Piece::with_state(kind, state)?.at(top, left);
        if glass.add(piece).is_blocked() {
            bail!("showcase piece {kind}#{state} does not fit at ({left}, {top})");
        }
        pieces.push(piece);
    }
    glass.store();
    Ok(Showcase {
        pieces,
        grid: glass.cells(),
    })
}

/// Lays the rotations of `kind` side by side, tops aligned.
fn rotation_strip(kind: PieceKind, charset: Charset) -> String {
    let arts: Vec<Vec<String>> = kind
        .shapes()
        .iter()
        .map(|shape| text::render_shape(*shape, charset))
        .collect();
    let height = arts.iter().map(Vec::len).max().unwrap_or(0);
    (0..height)
        .map(|y| {
            let cells: Vec<String> = arts
                .iter()
                .map(|art| {
                    let width = art[0].chars().count();
                    art.get(y).cloned().unwrap_or_else(|| " ".repeat(width))
                })
                .collect();
            cells.join("  ").trim_end().to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn run(arg: &ShowPiecesArg) -> anyhow::Result<()> {
    let showcase = showcase()?;
    if arg.json {
        return util::write_json_stdout(&showcase);
    }

    let charset = Charset::from(arg.charset);
    for kind in PieceKind::ALL {
        println!("{kind} ({} rotations)", kind.rotation_count());
        println!("{}", rotation_strip(kind, charset));
        println!();
    }
    println!("All rotations:");
    println!("{}", text::render_grid(&showcase.grid, charset));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_showcase_has_every_rotation() {
        let showcase = showcase().unwrap();
        for kind in PieceKind::ALL {
            let states: Vec<_> = showcase
                .pieces
                .iter()
                .filter(|piece| piece.kind() == kind)
                .map(Piece::state)
                .collect();
            let expected: Vec<_> = (0..kind.rotation_count()).collect();
            assert_eq!(states, expected, "{kind}");
        }
    }

    #[test]
    fn test_showcase_places_every_brick() {
        let showcase = showcase().unwrap();
        let bricks = showcase.grid.iter().flatten().flatten().count();
        assert_eq!(bricks, 4 * SHOWCASE.len());
    }

    #[test]
    fn test_showcase_text() {
        let showcase = showcase().unwrap();
        let text = text::render_grid(&showcase.grid, Charset::NUMBERS);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "1101011101");
        assert_eq!(lines[4], "1111000000");
        assert_eq!(lines[19], "0000000110");
    }

    #[test]
    fn test_rotation_strip() {
        assert_eq!(
            rotation_strip(PieceKind::S, Charset::NUMBERS),
            "011  10\n110  11\n     01"
        );
        assert_eq!(rotation_strip(PieceKind::O, Charset::NUMBERS), "11\n11");
    }

    #[test]
    fn test_showcase_json() {
        let json = serde_json::to_value(showcase().unwrap()).unwrap();
        assert_eq!(json["pieces"][0], "J#0@2,0");
        assert_eq!(json["grid"].as_array().unwrap().len(), Glass::HEIGHT);
    }
}
