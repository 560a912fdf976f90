pub mod assistant;
pub mod config;
pub mod db;
pub mod ingest;
pub mod llm;
pub mod util;
pub mod web;
