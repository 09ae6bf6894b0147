//! Discogs data reporting library - shared modules for the discogsdata CLI.

pub mod batch;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod output;
pub mod query;
pub mod table;

#[cfg(test)]
mod fixtures;
