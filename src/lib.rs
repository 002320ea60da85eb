pub mod config;
pub mod constants;
pub mod event;
pub mod handler;
pub mod logging;
pub mod store;
pub mod toggler;
