pub mod capture;
pub mod plugin;
mod pull_adapter;
