pub mod app;
pub mod attendance;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod registrants;
pub mod state;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
