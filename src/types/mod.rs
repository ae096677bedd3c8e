//! Type definitions for the Bybit API and stored observations.

pub mod bybit;

pub use bybit::{
    // Environment
    BybitEnvironment,
    // Requests
    ParamValue, RequestParameters,
    // Responses
    WalletAccount, WalletBalanceResponse, WalletBalanceResult,
    // Storage
    Observation, ObservationRecord,
};
