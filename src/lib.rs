//! Phone Relay — turns telephony webhook events into ClickUp tasks.

pub mod clickup;
pub mod config;
pub mod contacts;
pub mod directory;
pub mod error;
pub mod event;
pub mod phone;
pub mod relay;
pub mod server;
pub mod task;
