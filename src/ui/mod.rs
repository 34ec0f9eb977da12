//! Terminal UI layer.
//!
//! - [`surface`] defines the drawing contract and [`terminal`] implements it
//!   with ratatui.
//! - [`gate`] serializes every draw between the input loop and the update task.
//! - [`input`] and [`keys`] turn terminal events into chords.
//! - [`view`] maps store records to display rows.

pub mod gate;
pub mod input;
pub mod keys;
pub mod lifecycle;
pub mod surface;
pub mod terminal;
pub mod view;
