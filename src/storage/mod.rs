// src/storage/mod.rs
pub mod client_state;
