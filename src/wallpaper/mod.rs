pub mod client;
pub mod collections;
pub mod commands;
pub mod download;
pub mod imagen;
pub mod studio;
pub mod types;
pub mod view_model;
