//! Domain types shared between the gateway client and its transformers.

use bytes::Bytes;
use serde::Serialize;

use crate::{cards::CardNumber, masking::Secret};

/// Raw transport response: status code plus the undecoded body.
#[derive(Clone, Debug)]
pub struct Response {
    pub status_code: u16,
    pub response: Bytes,
}

/// An amount in minor currency units (cents, for the USD-only PayTrace API).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }
}

/// An amount formatted as a major-unit decimal string, the way the provider
/// wants it on the wire ("1.00" for 100 cents).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    /// Two-decimal conversion. PayTrace processes USD only, so the exponent
    /// is fixed.
    pub fn from_minor(amount: MinorUnit) -> Self {
        let minor = amount.get_amount_as_i64();
        let sign = if minor < 0 { "-" } else { "" };
        let magnitude = minor.unsigned_abs();
        Self(format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100))
    }

    pub fn get_amount_as_string(&self) -> &str {
        &self.0
    }
}

/// Keyed card data as collected from the cardholder.
#[derive(Clone, Debug)]
pub struct Card {
    pub number: CardNumber,
    pub expiry_month: Secret<u8>,
    pub expiry_year: Secret<u16>,
}

/// Billing address attached to a sale or authorization.
#[derive(Clone, Debug)]
pub struct BillingAddress {
    pub name: Secret<String>,
    pub street_address: Secret<String>,
    pub city: String,
    pub state: String,
    pub zip: Secret<String>,
}

/// Optional per-call inputs for the payment operations.
#[derive(Clone, Debug, Default)]
pub struct PaymentOptions {
    pub billing_address: Option<BillingAddress>,
}

/// Provider response codes normalized to gateway-independent kinds.
/// Codes outside the table carry no normalized kind; the raw code stays
/// available in [`TransactionResult::raw_response`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardErrorCode {
    CardDeclined,
    Declined,
    ProcessingError,
}

/// The uniform outcome of one gateway operation.
///
/// Declines and provider-side faults land here with `success == false`;
/// only transport-level failures surface as errors instead.
#[derive(Clone, Debug)]
pub struct TransactionResult {
    pub success: bool,
    pub message: Option<String>,
    pub transaction_id: Option<String>,
    pub error_code: Option<StandardErrorCode>,
    pub avs_result: Option<String>,
    pub cvv_result: Option<String>,
    pub raw_response: serde_json::Value,
}
