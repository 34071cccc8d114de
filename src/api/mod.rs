pub mod auth;
pub mod client;
pub mod export;
pub mod persistence;
pub mod session;

pub use client::{HttpApi, MindMapApi, MindMapDraft};
pub use persistence::{PersistenceClient, SaveOutcome, SkipReason};
pub use session::AppContext;
