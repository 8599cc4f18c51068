//! # ACH SDK
//!
//! Typed clients for the ACH Concourse record-keeping services.
//!
//! This crate provides:
//!
//! - Core abstractions for backend clients with a unified interface
//! - One typed client per backend: ODFI, RDFI, ledger and EIP
//! - A single error type carrying service, endpoint and HTTP status context
//! - Per-backend configuration with validation
//!
//! ## Architecture
//!
//! - `BackendClient`: the base trait every service client implements
//! - `ClientBuilder`: configures the shared `reqwest` client and produces any
//!   concrete client through `FromTransport`
//! - `HttpTransport`: JSON request/response plumbing and status mapping
//! - `ServiceError`: comprehensive error handling system
//!
//! The clients never retry. A failed call is reported once to the caller.

pub mod core;
pub use core::{BackendClient, ClientBuilder, EntryFilter, FromTransport};

pub mod services;
pub use services::common::{ApiPath, UserAgent};
pub use services::{eip, ledger, odfi, rdfi};
pub use services::eip::EipClient;
pub use services::ledger::LedgerClient;
pub use services::odfi::OdfiClient;
pub use services::rdfi::RdfiClient;

pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

pub mod config;
pub use config::BackendConfig;
