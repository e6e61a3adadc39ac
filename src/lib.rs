//! # TaskAI
//!
//! A local-first task manager with embedding-assisted recommendations.
//!
//! Tasks, comments, and users live in SQLite. The `recommend` command ranks
//! open tasks with the scorer from `taskai-core`: a weighted sum of semantic
//! similarity, priority, status, progress, and keyword signals, tuned by a
//! ranking mode (`urgent`, `daily`, `progress`, `impact`).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────────┐
//! │   CLI    │──▶│  TaskStore    │──▶│    SQLite     │
//! │ (taskai) │   │ (sqlite_store)│   │ tasks/users/  │
//! └────┬─────┘   └───────────────┘   │ comments      │
//!      │                             └──────────────┘
//!      ▼
//! ┌──────────────┐   ┌─────────────────────────┐
//! │  recommend   │──▶│ taskai-core::rank       │
//! │  (timeout)   │   │ + Encoders (embedding)  │
//! └──────────────┘   └─────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! taskai init
//! taskai task add --title "Fix bug di backend" --description "Error 500 on login" --priority 1
//! taskai recommend --mode urgent --explain
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite `TaskStore` |
//! | [`embedding`] | Embedding provider implementations |
//! | [`tasks`] | Task commands |
//! | [`comments`] | Comment commands |
//! | [`users`] | User commands |
//! | [`recommend`] | Ranking commands with timeout |

pub mod comments;
pub mod config;
pub mod db;
pub mod embedding;
pub mod migrate;
pub mod recommend;
pub mod sqlite_store;
pub mod tasks;
pub mod users;

pub use taskai_core::{mode, models, rank};
