// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod calls;
pub mod quiz;
