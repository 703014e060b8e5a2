use std::time::Duration;

use brickfall_engine::{HighscoreStore, Session, SessionState};
use crossterm::event::Event;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    command::play::input::{self, Action},
    tui::{App, RenderMode, Runtime},
    view::widgets::{KeyBindingDisplay, SessionDisplay},
};

const FPS: f64 = 60.0;

#[derive(Debug)]
pub struct PlayApp<S> {
    session: Session<S>,
    show_shadow: bool,
    is_exiting: bool,
}

impl<S> PlayApp<S>
where
    S: HighscoreStore,
{
    pub fn new(session: Session<S>, show_shadow: bool) -> Self {
        Self {
            session,
            show_shadow,
            is_exiting: false,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Game(command) => {
                if self.session.apply(command) {
                    log::trace!("{command}");
                }
            }
            Action::ToggleShadow => self.show_shadow = !self.show_shadow,
            Action::Quit => self.is_exiting = true,
        }
    }
}

impl<S> App for PlayApp<S>
where
    S: HighscoreStore,
{
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        if let Some(key) = event.as_key_event()
            && let Some(action) = input::action_for(key, self.session.state())
        {
            self.perform(action);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.session.snapshot(self.show_shadow);
        let help = match self.session.state() {
            SessionState::Playing => input::PLAYING_HELP,
            SessionState::Paused => input::PAUSED_HELP,
            SessionState::GameOver => input::GAME_OVER_HELP,
        };

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(22), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(SessionDisplay::new(&snapshot), main_area);
        frame.render_widget(KeyBindingDisplay::new(help), help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        self.session.advance(elapsed);
    }
}
