// SPDX-License-Identifier: MIT

//! Weekly-Quiz: backend for a weekly trivia competition.
//!
//! This crate provides the API for registration, question delivery,
//! answer scoring, and the weekly/all-time leaderboards, plus the
//! v1 -> v2 schema migration toolkit (`bin/migrate.rs`).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod week;

use config::Config;
use db::FirestoreDb;
use services::LeaderboardService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub leaderboard: LeaderboardService,
}
