#[macro_use]
extern crate rocket;

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod entrypoints;
pub mod error;
pub mod metrics;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
