pub mod app;
pub mod config;
pub mod directory;
pub mod events;
pub mod notify;
pub mod shared;
pub mod store;
pub mod workflow;
