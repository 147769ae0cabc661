//! Interactive widgets as pure state machines.
//!
//! Organized along the same boundaries as an Elm-style TUI:
//! - `state`: widget state types and their constructors
//! - `update`: pure transitions, (state, key) → transition
//! - `view`: pure rendering of bodies, prompt lines and summaries
//!
//! The effects (reading keys, writing to the terminal) live in
//! [`crate::logger`], which drives these layers.

pub mod state;
pub mod update;
pub mod view;
