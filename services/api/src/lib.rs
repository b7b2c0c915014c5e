//! trackshare API service
//!
//! HTTP backend of a track-sharing application: accounts, playlists,
//! tracks and likes, served by axum over PostgreSQL.

pub mod accounts;
pub mod config;
pub mod error;
pub mod jwt;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod tracks;
pub mod validation;
