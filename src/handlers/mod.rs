// src/handlers/mod.rs
pub mod earthquakes;
pub mod error;
pub mod plates;
