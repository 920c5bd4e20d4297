pub mod app;
pub mod config;
pub mod events;
pub mod protocol;
pub mod sys;
