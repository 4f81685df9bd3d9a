// src/form/mod.rs
pub mod banner;
pub mod controller;
pub mod errors;
pub mod fields;
pub mod rules;
