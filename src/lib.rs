pub mod api;
pub mod auth;
pub mod calculator;
pub mod config;
pub mod models;
pub mod services;
