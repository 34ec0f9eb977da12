//! termgram is a terminal messenger client.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the data model, the in-memory store, inbound update parsing
//!   and configuration.
//! - [`controller`] runs the key-driven input loop and the update dispatcher
//!   that share the store and the screen.
//! - [`backend`] defines the outbound command surface and ships an offline
//!   implementation.
//! - [`ui`] renders the terminal interface and reads key input.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod backend;
pub mod cli;
pub mod controller;
pub mod core;
pub mod ui;
pub mod utils;
