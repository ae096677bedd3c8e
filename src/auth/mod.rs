//! Authentication for exchange APIs.

pub mod bybit;

pub use bybit::BybitAuth;
