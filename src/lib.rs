pub mod api;
pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod probe;
pub mod state;

#[cfg(test)]
mod testing;
