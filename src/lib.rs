//! Client for the PayTrace payment gateway.
//!
//! [`Paytrace`] speaks the provider's JSON API and exposes the usual gateway
//! vocabulary: purchase, authorize, capture, refund, void and verify. Every
//! operation resolves to a uniform [`TransactionResult`]; declines come back
//! as unsuccessful results, and only transport or encoding failures surface
//! as errors.
//!
//! The client authenticates with an OAuth password grant and transparently
//! re-authenticates once when the provider reports the bearer token invalid.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use paytrace::{Paytrace, PaytraceConfig, Proxy, ReqwestClient};
//!
//! # async fn run(config: PaytraceConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ReqwestClient::new(&Proxy::default())?);
//! let gateway = Paytrace::connect(config, client).await?;
//! let card = paytrace::Card {
//!     number: "4242424242424242".parse()?,
//!     expiry_month: 9.into(),
//!     expiry_year: 2027.into(),
//! };
//! let result = gateway
//!     .purchase(paytrace::MinorUnit::new(1000), &card, &Default::default())
//!     .await?;
//! println!("approved: {}", result.success);
//! # Ok(())
//! # }
//! ```

pub mod cards;
pub mod errors;
pub mod ext_traits;
pub mod http_client;
pub mod masking;
pub mod paytrace;
pub mod request;
pub mod types;

pub use self::{
    cards::CardNumber,
    http_client::{ApiClient, Proxy, ReqwestClient},
    paytrace::{Paytrace, PaytraceConfig},
    types::{
        BillingAddress, Card, MinorUnit, PaymentOptions, StandardErrorCode, TransactionResult,
    },
};
