pub mod arbiter;
pub mod config;
pub mod drag;
pub mod events;
pub mod geometry;
pub mod layout;
mod macros;
pub mod menu;
pub mod sys;
