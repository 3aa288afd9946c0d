//! docflow-cli library, exposed so the modules can be unit tested.

pub mod app;
pub mod commands;
pub mod error;
pub mod flow;
pub mod render;
