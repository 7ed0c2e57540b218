pub mod aws;
pub mod billing;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;
pub mod utils;
