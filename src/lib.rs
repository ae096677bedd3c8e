//! Bybit Wallet Balance Logger Library
//!
//! This library provides modules for:
//! - HMAC-SHA256 request signing for the Bybit v5 API
//! - REST client for the wallet balance endpoint
//! - Fixed-interval polling with shutdown support
//! - Append-only CSV storage of balance observations
//! - Configuration loading from the environment

pub mod auth;
pub mod balance_api;
pub mod config;
pub mod error;
pub mod poller;
pub mod shutdown;
pub mod store;
pub mod types;
