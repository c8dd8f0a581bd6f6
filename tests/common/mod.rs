//! Shared cucumber world and helpers for the behaviour tests

pub mod world;

#[allow(unused_imports)]
pub use world::HttpWorld;
