pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod palette;
pub mod projection;
pub mod state;
pub mod ui;

pub use app::router;
pub use client::{CredentialProvider, ExpenseApi, PendingFetch, StaticToken};
pub use config::Settings;
pub use state::AppState;
