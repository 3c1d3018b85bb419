//! entrain: a multi-stage binaural / isochronic tone session engine.
//!
//! Session text is compiled by [`dsl`] into a [`stage::Session`], which the
//! [`session`] scheduler plays back on a one-second tick.

pub mod config;
pub mod dsl;
pub mod library;
pub mod session;
pub mod stage;
