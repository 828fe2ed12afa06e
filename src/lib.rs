pub mod api;
pub mod config;
pub mod events;
pub mod market;
pub mod suggest;
