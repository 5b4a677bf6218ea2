// ABOUTME: Library root for hedera-local - exposes the controller, states and services.
// ABOUTME: The main binary is in main.rs.

pub mod accounts;
pub mod cli;
pub mod config;
pub mod controller;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod runtime;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;
