mod database;
mod state_builder;

pub use database::connect_and_migrate;
pub use state_builder::{app_state_for, build_app_state};
