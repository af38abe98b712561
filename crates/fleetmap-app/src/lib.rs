//! Application service layer - view controller, polling, config

pub mod app;
pub mod config;
pub mod repository;
