pub mod activity;
pub mod affinity;
pub mod analytics;
pub mod app;
pub mod config;
pub mod data_source;
pub mod error;
pub mod filtering;
pub mod fixtures;
pub mod matchmaking;
pub mod models;
pub mod ranking;
pub mod seed;
pub mod storage;
pub mod tags;
pub mod upload;
pub mod user_models;
pub mod user_storage;

pub use app::{App, Phase};
pub use error::{Error, Result};
