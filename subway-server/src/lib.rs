//! Subway line directory server.
//!
//! Keeps a set of lines, each an ordered chain of stations joined by
//! sections, and serves them over HTTP. Adding a section inside an
//! existing one splits it; removing a station merges its neighbours.

pub mod config;
pub mod directory;
pub mod domain;
pub mod web;
