// src/services/mod.rs
pub mod aggregate;
pub mod cache;
pub mod feed;
pub mod normalizer;
pub mod pipeline;
pub mod plates;
pub mod summary;
pub mod window;
