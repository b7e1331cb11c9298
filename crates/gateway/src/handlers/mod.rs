//! Request handlers

pub mod flowchart;
pub mod health;
pub mod network;
