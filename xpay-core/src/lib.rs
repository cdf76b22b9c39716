//! Shared types for the x402 micropayment execution core.
//!
//! This crate is blockchain-agnostic: it defines the closed [`network::Network`]
//! set, arbitrary-precision [`amount::Amount`] arithmetic, the [`address::Address`]
//! and [`asset::Asset`] entities, the [`chain::ChainAdapter`] capability trait that
//! chain-specific crates implement, and the [`error::FailureKind`] taxonomy shared
//! by the client, router, verifier, and wallet.
//!
//! # Modules
//!
//! - [`network`] — the closed `Network` tagged set and its canonical wire names.
//! - [`address`] / [`asset`] / [`amount`] — entity types from the data model.
//! - [`signer`] — the [`signer::Signer`] capability trait and [`signer::SensitiveBytes`].
//! - [`chain`] — the [`chain::ChainAdapter`] trait and [`chain::ParsedTransaction`].
//! - [`payment`] — `PaymentRequirement`, `PaymentIntent`, `PaymentReceipt`, `ExecutionResult`.
//! - [`health`] — `ProviderHealth` and the health cache TTL.
//! - [`stats`] — `RouterStats`.
//! - [`error`] — the exhaustive `FailureKind`/`PaymentError` taxonomy.
//! - [`wire`] — byte-exact §6 wire encodings (402 body, `X-Payment` header).
//! - [`config`] — explicit configuration records (no process-env reads).

pub mod address;
pub mod amount;
pub mod asset;
pub mod chain;
pub mod config;
pub mod error;
pub mod health;
pub mod network;
pub mod payment;
pub mod signer;
pub mod stats;
pub mod wire;
