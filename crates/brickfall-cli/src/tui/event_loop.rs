use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::TuiEvent;

/// When to redraw.
#[derive(Debug, Clone, Copy, Default)]
pub enum RenderMode {
    /// Redraw after every tick or terminal event.
    #[default]
    OnDirty,
    /// Like `OnDirty`, with at most one redraw per interval.
    Throttled(Duration),
}

impl RenderMode {
    #[must_use]
    pub fn throttled_from_rate(rate: f64) -> Self {
        Self::Throttled(Duration::from_secs_f64(1.0 / rate))
    }
}

/// Produces tick, render and terminal events in order.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    last_tick: Option<Instant>,
    last_render: Option<Instant>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(super) fn new() -> Self {
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            last_tick: None,
            last_render: None,
            dirty: true,
        }
    }

    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Blocks until the next tick, render or terminal event.
    ///
    /// The first tick reports zero elapsed time; later ticks report the real
    /// time since the previous one, which may exceed the tick interval when
    /// the loop was busy.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(tick_interval) = self.tick_interval {
                match self.last_tick {
                    None => {
                        self.last_tick = Some(now);
                        self.dirty = true;
                        return Ok(TuiEvent::Tick(Duration::ZERO));
                    }
                    Some(last_tick) if now.duration_since(last_tick) >= tick_interval => {
                        self.last_tick = Some(now);
                        self.dirty = true;
                        return Ok(TuiEvent::Tick(now.duration_since(last_tick)));
                    }
                    Some(_) => {}
                }
            }

            let do_render = match self.render_mode {
                RenderMode::OnDirty => self.dirty,
                RenderMode::Throttled(interval) => {
                    self.dirty
                        && self
                            .last_render
                            .is_none_or(|last| now.duration_since(last) >= interval)
                }
            };
            if do_render {
                self.last_render = Some(now);
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.compute_timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn compute_timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self
            .tick_interval
            .map(|interval| self.last_tick.map_or(now, |last| last + interval));
        let next_render_at = match self.render_mode {
            RenderMode::OnDirty => self.dirty.then_some(now),
            RenderMode::Throttled(interval) => self
                .dirty
                .then(|| self.last_render.map_or(now, |last| last + interval)),
        };
        let next_timeout_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_timeout_at.saturating_duration_since(now))
    }
}
