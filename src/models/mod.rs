// src/models/mod.rs

pub mod form;
pub mod question;
pub mod response;
pub mod submission;
