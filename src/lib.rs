#[cfg(feature = "app")]
pub mod app;
pub mod autoregister;
pub mod categories;
pub mod clock;
pub mod config;
pub mod dates;
pub mod format;
pub mod models;
pub mod portfolio;
pub mod recurrence;
pub mod stats;
pub mod storage;
