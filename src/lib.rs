pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod format;
pub mod models;
pub mod panels;
pub mod portal;
pub mod render;
pub mod report;
pub mod tabs;
