pub mod atlas;
pub mod command;
pub mod config;
pub mod controls;
pub mod coords;
pub mod error;
pub mod models;
pub mod render;
pub mod selection;
pub mod session;
pub mod surface;
