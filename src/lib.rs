pub mod broker;
pub mod config;
pub mod coordinator;
pub mod draft;
pub mod error;
pub mod event;
pub mod feedback;
pub mod input;
pub mod model;
pub mod payload;
pub mod refresh;
pub mod sizing;
pub mod solvency;
pub mod ui;
pub mod ui_handlers;
