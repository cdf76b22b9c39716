//! The 402 client protocol engine (C1, §4.1): negotiates a payment-required
//! challenge, routes the payment through an [`xpay_provider::Router`], and
//! retries the original request with a receipt.

mod engine;

pub use engine::ClientEngine;

pub use xpay_core::payment::ExecutionResult;
