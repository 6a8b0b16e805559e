pub mod app;
pub mod config;
pub mod driver;
pub mod poller;
pub mod services;
pub mod settings;
pub mod surface;
