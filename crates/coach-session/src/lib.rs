pub mod chat;
pub mod config;
pub mod error;
pub mod highlight;
pub mod session;
