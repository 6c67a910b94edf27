use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    cards::CardNumber,
    masking::Secret,
    types::{
        BillingAddress, Card, MinorUnit, PaymentOptions, StandardErrorCode, StringMajorUnit,
        TransactionResult,
    },
};

/// Sentinel the provider puts in the `error` field when the bearer token has
/// expired or been revoked.
pub(crate) const INVALID_TOKEN: &str = "invalid_token";

/// Envelope around every transaction payload. The provider expects the
/// credentials repeated in the body of each call, on top of the bearer
/// header.
#[derive(Debug, Serialize)]
pub struct PaytraceTransactionBody<T: Serialize> {
    #[serde(flatten)]
    pub payload: T,
    pub username: Secret<String>,
    pub password: Secret<String>,
    pub integrator_id: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct PaytracePaymentsRequest {
    amount: StringMajorUnit,
    credit_card: PaytraceCard,
    #[serde(skip_serializing_if = "Option::is_none")]
    billing_address: Option<PaytraceBillingAddress>,
}

#[derive(Debug, Serialize)]
pub struct PaytraceCard {
    number: CardNumber,
    expiration_month: Secret<u8>,
    expiration_year: Secret<u16>,
}

#[derive(Debug, Serialize)]
pub struct PaytraceBillingAddress {
    name: Secret<String>,
    street_address: Secret<String>,
    city: String,
    state: String,
    zip: Secret<String>,
}

impl From<&Card> for PaytraceCard {
    fn from(card: &Card) -> Self {
        Self {
            number: card.number.clone(),
            expiration_month: card.expiry_month.clone(),
            expiration_year: card.expiry_year.clone(),
        }
    }
}

impl From<&BillingAddress> for PaytraceBillingAddress {
    fn from(address: &BillingAddress) -> Self {
        Self {
            name: address.name.clone(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
        }
    }
}

impl From<(MinorUnit, &Card, &PaymentOptions)> for PaytracePaymentsRequest {
    fn from((amount, card, options): (MinorUnit, &Card, &PaymentOptions)) -> Self {
        Self {
            amount: StringMajorUnit::from_minor(amount),
            credit_card: card.into(),
            billing_address: options.billing_address.as_ref().map(Into::into),
        }
    }
}

/// Capture, refund and void all address an earlier transaction by id alone;
/// any caller-supplied amount is not transmitted.
#[derive(Debug, Serialize)]
pub struct PaytraceTransactionIdRequest {
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct PaytraceAccessTokenRequest {
    pub grant_type: &'static str,
    pub username: Secret<String>,
    pub password: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PaytraceAccessTokenResponse {
    pub access_token: Option<Secret<String>>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

/// The provider is loose about numeric fields: ids and response codes arrive
/// as either JSON numbers or strings.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PaytraceIdentifier {
    Number(u64),
    Text(String),
}

impl fmt::Display for PaytraceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PaytraceTransactionResponse {
    pub success: Option<bool>,
    pub status_message: Option<String>,
    pub transaction_id: Option<PaytraceIdentifier>,
    pub response_code: Option<PaytraceIdentifier>,
    pub avs_response: Option<String>,
    pub csc_response: Option<String>,
    pub error: Option<String>,
}

impl PaytraceTransactionResponse {
    pub fn has_invalid_token_error(&self) -> bool {
        self.error.as_deref() == Some(INVALID_TOKEN)
    }
}

impl StandardErrorCode {
    pub fn from_response_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::CardDeclined),
            "102" => Some(Self::Declined),
            "400" | "401" | "500" => Some(Self::ProcessingError),
            _ => None,
        }
    }
}

/// A decoded transaction response paired with the untouched JSON body.
#[derive(Debug)]
pub struct PaytraceCallOutcome {
    pub response: PaytraceTransactionResponse,
    pub raw: serde_json::Value,
}

impl PaytraceCallOutcome {
    pub fn into_result(self) -> TransactionResult {
        TransactionResult {
            success: self.response.success.unwrap_or(false),
            message: self.response.status_message,
            transaction_id: self.response.transaction_id.map(|id| id.to_string()),
            error_code: self
                .response
                .response_code
                .map(|code| code.to_string())
                .and_then(|code| StandardErrorCode::from_response_code(&code)),
            avs_result: self.response.avs_response,
            cvv_result: self.response.csc_response,
            raw_response: self.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::Secret;

    fn test_card() -> Card {
        Card {
            number: "4242424242424242".parse().unwrap(),
            expiry_month: Secret::new(9),
            expiry_year: Secret::new(2027),
        }
    }

    #[test]
    fn payments_request_serializes_card_and_major_unit_amount() {
        let request =
            PaytracePaymentsRequest::from((MinorUnit::new(150), &test_card(), &PaymentOptions::default()));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["amount"], "1.50");
        assert_eq!(value["credit_card"]["number"], "4242424242424242");
        assert_eq!(value["credit_card"]["expiration_month"], 9);
        assert_eq!(value["credit_card"]["expiration_year"], 2027);
        assert!(value.get("billing_address").is_none());
    }

    #[test]
    fn payments_request_includes_billing_address_when_given() {
        let options = PaymentOptions {
            billing_address: Some(BillingAddress {
                name: Secret::new("Jim Smith".to_string()),
                street_address: Secret::new("456 My Street".to_string()),
                city: "Ottawa".to_string(),
                state: "ON".to_string(),
                zip: Secret::new("K1C2N6".to_string()),
            }),
        };
        let request = PaytracePaymentsRequest::from((MinorUnit::new(100), &test_card(), &options));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["billing_address"]["name"], "Jim Smith");
        assert_eq!(value["billing_address"]["street_address"], "456 My Street");
        assert_eq!(value["billing_address"]["zip"], "K1C2N6");
    }

    #[test]
    fn transaction_body_injects_credentials_next_to_the_payload() {
        let body = PaytraceTransactionBody {
            payload: PaytraceTransactionIdRequest {
                transaction_id: "392483066".to_string(),
            },
            username: Secret::new("merchant".to_string()),
            password: Secret::new("hunter2".to_string()),
            integrator_id: Secret::new("intg-77".to_string()),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["transaction_id"], "392483066");
        assert_eq!(value["username"], "merchant");
        assert_eq!(value["password"], "hunter2");
        assert_eq!(value["integrator_id"], "intg-77");
        assert!(value.get("amount").is_none());
    }

    #[test]
    fn response_code_table_matches_the_provider_contract() {
        assert_eq!(
            StandardErrorCode::from_response_code("1"),
            Some(StandardErrorCode::CardDeclined)
        );
        assert_eq!(
            StandardErrorCode::from_response_code("102"),
            Some(StandardErrorCode::Declined)
        );
        for code in ["400", "401", "500"] {
            assert_eq!(
                StandardErrorCode::from_response_code(code),
                Some(StandardErrorCode::ProcessingError)
            );
        }
        assert_eq!(StandardErrorCode::from_response_code("101"), None);
        assert_eq!(StandardErrorCode::from_response_code("9000"), None);
    }

    #[test]
    fn numeric_and_textual_transaction_ids_both_decode() {
        let numeric: PaytraceTransactionResponse =
            serde_json::from_str(r#"{"success":true,"transaction_id":392483066}"#).unwrap();
        let textual: PaytraceTransactionResponse =
            serde_json::from_str(r#"{"success":true,"transaction_id":"392483066"}"#).unwrap();

        assert_eq!(numeric.transaction_id.unwrap().to_string(), "392483066");
        assert_eq!(textual.transaction_id.unwrap().to_string(), "392483066");
    }

    #[test]
    fn invalid_token_sentinel_is_detected() {
        let response: PaytraceTransactionResponse =
            serde_json::from_str(r#"{"error":"invalid_token"}"#).unwrap();
        assert!(response.has_invalid_token_error());

        let response: PaytraceTransactionResponse =
            serde_json::from_str(r#"{"error":"invalid_request"}"#).unwrap();
        assert!(!response.has_invalid_token_error());
    }
}
