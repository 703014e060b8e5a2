//! Minimal terminal runtime: a fixed-rate tick, render on change, and
//! crossterm events dispatched to an [`App`].

pub use self::{app::App, event_loop::RenderMode, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
