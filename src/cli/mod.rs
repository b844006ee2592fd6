//! Command implementations and terminal output

pub mod history;
pub mod inspect;
pub mod latest;
pub mod setup;
pub mod ui;
