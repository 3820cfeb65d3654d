pub mod config;
pub mod history;
pub mod pipeline;
pub mod render;
pub mod report;
