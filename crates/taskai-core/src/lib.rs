//! # TaskAI Core
//!
//! Shared, I/O-free logic for TaskAI: task models, ranking modes,
//! the embedding provider trait, the task store abstraction, and the
//! recommendation scorer.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Concrete embedding providers and the
//! SQLite store live in the `taskai` app crate.

pub mod embedding;
pub mod mode;
pub mod models;
pub mod rank;
pub mod store;
