//! Client-side library for the meme coin program.
//!
//! Includes account contexts, the transaction builder and submission pipeline, read-only views,
//! and the front-end session with its reducer.

pub mod builder;
pub mod context;
pub mod e2e_helpers;
pub mod error;
pub mod logs;
pub mod session;
pub mod state;
pub mod submission;
pub mod transactions;
pub mod views;
pub mod wallet;

pub use logs::LogColor;
