pub mod commands;
pub mod config;
pub mod fs;
pub mod logging;
pub mod models;
pub mod report;
pub mod storage;
pub mod validation;
pub mod verify;
