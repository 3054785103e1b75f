//! decode-service: explains aviation radio phrases in plain English using a
//! hosted language model.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
