//! Creditbook - credit ledger core for subscription and one-time billing
//!
//! This library maintains per-user credit balances driven by asynchronous
//! payment-provider notifications (subscription end, one-time refund,
//! subscription refund). All balance mutations funnel through a single
//! transactional ledger mutator so that concurrent, duplicated, or
//! out-of-order provider events can never drive a balance negative or
//! leave the audit trail inconsistent with the stored balances.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod payments;
