// src/handlers/mod.rs

pub mod forms;
pub mod health;
pub mod submissions;
