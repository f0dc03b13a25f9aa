//! Client library for a vocabulary-learning service: an authenticated API
//! gateway, resource-grouped endpoints, and the spaced-repetition dashboard
//! derived from them (due counts, streak progress, today's study log, banners).

pub mod api;
pub mod config;
pub mod core;
pub mod persistence;
pub mod srs;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use crate::core::{
    ApiError,
    LexiqError,
};
