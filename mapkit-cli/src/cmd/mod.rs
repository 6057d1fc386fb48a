pub mod config;
pub mod list;
pub mod run;
