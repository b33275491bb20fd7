pub mod config;
pub mod logging;

pub mod control;
pub mod fetch;
pub mod manifest;
pub mod preflight;
pub mod sample;
pub mod scheduler;
