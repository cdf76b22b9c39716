//! Provider execution and routing (C2, §4.2): submits a [`PaymentIntent`]
//! through a facilitator or direct transfer, retries and fails over per a
//! [`xpay_core::config::RouterConfig`], and always re-verifies the result
//! on-chain before reporting success.

mod context;
mod direct;
mod facilitator;
mod provider;
mod router;

pub use context::ExecutionContext;
pub use direct::DirectProvider;
pub use facilitator::FacilitatorProvider;
pub use provider::Provider;
pub use router::Router;

pub use xpay_core::payment::PaymentIntent;
