//! Round core for a crash-style signal game.
//!
//! A round is a fixed chain of timed phases (status log, flight, impact,
//! reveal) ending in a sampled outcome that is appended to a bounded history.
//! The core computes positions, angles, timings, and outcomes; rendering,
//! layout, and text live behind the traits in [`presentation`].

pub mod activity_log;
pub mod animator;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod outcome;
pub mod presentation;
pub mod rng;
pub mod sampler;
pub mod sequencer;
pub mod timing;
pub mod trajectory;
pub mod types;
