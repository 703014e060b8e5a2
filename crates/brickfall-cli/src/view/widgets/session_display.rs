use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use brickfall_engine::Snapshot;

use super::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Whole game screen: stats on the left, the glass, the next piece on the right.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let block_padding = Padding::symmetric(1, 0);
        let border_style = if snapshot.is_over {
            color::RED
        } else if snapshot.is_paused {
            color::YELLOW
        } else {
            color::WHITE
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = BoardDisplay::new(snapshot).block(
            Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let next_panel = PieceDisplay::new().piece(snapshot.next).block(panel("NEXT"));
        let stats_panel = StatsDisplay::new(snapshot).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats_panel.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] =
            Layout::vertical([Constraint::Length(stats_panel.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats_panel.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        let popup = if snapshot.is_over {
            Some(("GAME OVER", Style::new().fg(color::WHITE).bg(color::RED)))
        } else if snapshot.is_paused {
            Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
        } else {
            None
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
