pub mod api;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod suggestions;
pub mod todo_edit;
pub mod todo_list;
pub mod ui;
