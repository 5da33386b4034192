pub mod action_executor;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod desktop_entry;
pub mod discovery;
pub mod input_state;
pub mod launch_counts;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod search;
pub mod terminal;
