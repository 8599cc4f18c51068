//! Backend service clients

pub mod common;
pub mod eip;
pub mod ledger;
pub mod odfi;
pub mod rdfi;
