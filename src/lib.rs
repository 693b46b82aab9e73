pub mod catalog;
pub mod config;
pub mod gpa;
pub mod input;
pub mod output;
pub mod resolver;
pub mod telemetry;
