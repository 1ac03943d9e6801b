pub mod config;
pub mod memo;
