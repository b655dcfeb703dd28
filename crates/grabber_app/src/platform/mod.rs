pub mod app;
pub mod config_file;
pub mod effects;
pub mod input;
pub mod logging;
pub mod relay_server;
pub mod ui;
