pub mod browse;
pub mod config;
pub mod invoke;
pub mod issue;
pub mod issues;
pub mod project;
pub mod settings;
