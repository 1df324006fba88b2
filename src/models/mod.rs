// src/models/mod.rs

pub mod call;
pub mod question;
pub mod submission;
pub mod support;
pub mod user;
