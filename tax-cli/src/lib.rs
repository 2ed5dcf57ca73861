pub mod app;
pub mod config;
pub mod income_csv;
pub mod logging;
pub mod report;
