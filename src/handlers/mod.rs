// src/handlers/mod.rs

pub mod exam;
pub mod resource;
pub mod search;
pub mod subscription;
