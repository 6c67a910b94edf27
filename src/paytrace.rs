pub mod transformers;

use std::sync::{Arc, LazyLock};

use error_stack::ResultExt;
use regex::Regex;
use tokio::sync::RwLock;

use crate::{
    errors::{ConnectorError, CustomResult},
    ext_traits::BytesExt,
    http_client::ApiClient,
    masking::{Mask, PeekInterface, Secret},
    request::{Method, RequestBuilder, RequestContent},
    types::{Card, MinorUnit, PaymentOptions, TransactionResult},
};
use transformers as paytrace;

/// PayTrace exposes a single host; sandbox behavior is selected by the
/// credentials, not by a separate URL.
const LIVE_URL: &str = "https://api.paytrace.com";
const TEST_URL: &str = "https://api.paytrace.com";

/// Nominal amount charged by [`Paytrace::verify`] before the immediate void.
const VERIFY_AMOUNT: MinorUnit = MinorUnit::new(100);

/// Connector configuration.
///
/// `username`, `password` and `access_token` must be present and non-empty
/// before any network call is attempted. `integrator_id` is only required
/// once a transaction operation is issued. `base_url` overrides the built-in
/// endpoints, which is how tests and local stubs point the client elsewhere.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct PaytraceConfig {
    pub username: Secret<String>,
    pub password: Secret<String>,
    pub access_token: Secret<String>,
    #[serde(default)]
    pub integrator_id: Option<Secret<String>>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
}

impl PaytraceConfig {
    fn validate(&self) -> CustomResult<(), ConnectorError> {
        let required: [(&'static str, &Secret<String>); 3] = [
            ("username", &self.username),
            ("password", &self.password),
            ("access_token", &self.access_token),
        ];
        for (field_name, value) in required {
            if value.peek().is_empty() {
                return Err(ConnectorError::MissingRequiredField { field_name }.into());
            }
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url,
            None if self.test_mode => TEST_URL,
            None => LIVE_URL,
        }
    }
}

/// PayTrace gateway client.
///
/// Owns the credentials and the current bearer token, and translates the
/// uniform operation vocabulary (purchase, authorize, capture, refund, void,
/// verify) into provider calls. The token is the only mutable state: when
/// the provider reports it invalid, the client re-authenticates once and
/// replays the original request once, returning the second response.
pub struct Paytrace {
    config: PaytraceConfig,
    access_token: RwLock<Secret<String>>,
    client: Arc<dyn ApiClient>,
}

impl std::fmt::Debug for Paytrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paytrace")
            .field("config", &self.config)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

impl Paytrace {
    /// Builds a client and eagerly trades the configured credentials for a
    /// fresh bearer token. If the token endpoint answers without an
    /// `access_token` field the configured token is kept as-is and any
    /// problem with it surfaces on the first API call.
    pub async fn connect(
        config: PaytraceConfig,
        client: Arc<dyn ApiClient>,
    ) -> CustomResult<Self, ConnectorError> {
        config.validate()?;
        let connector = Self {
            access_token: RwLock::new(config.access_token.clone()),
            config,
            client,
        };
        let observed = connector.current_token().await;
        connector.refresh_access_token(&observed).await?;
        Ok(connector)
    }

    pub async fn purchase(
        &self,
        amount: MinorUnit,
        card: &Card,
        options: &PaymentOptions,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let body = self.transaction_content(paytrace::PaytracePaymentsRequest::from((
            amount, card, options,
        )))?;
        self.commit_with_token_refresh("sale/keyed", body).await
    }

    pub async fn authorize(
        &self,
        amount: MinorUnit,
        card: &Card,
        options: &PaymentOptions,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let body = self.transaction_content(paytrace::PaytracePaymentsRequest::from((
            amount, card, options,
        )))?;
        self.commit_with_token_refresh("authorization/keyed", body)
            .await
    }

    /// Captures a previous authorization in full. The amount parameter is
    /// accepted for interface symmetry with the other operations but is not
    /// transmitted; only the transaction id travels.
    pub async fn capture(
        &self,
        _amount: Option<MinorUnit>,
        authorization_id: &str,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let body = self.transaction_content(paytrace::PaytraceTransactionIdRequest {
            transaction_id: authorization_id.to_string(),
        })?;
        self.commit_with_token_refresh("authorization/capture", body)
            .await
    }

    /// Refunds a settled transaction by id. As with [`Self::capture`], the
    /// amount parameter is ignored; the provider decides full versus partial
    /// from the transaction it looks up.
    pub async fn refund(
        &self,
        _amount: Option<MinorUnit>,
        authorization_id: &str,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let body = self.transaction_content(paytrace::PaytraceTransactionIdRequest {
            transaction_id: authorization_id.to_string(),
        })?;
        self.commit_with_token_refresh("refund/for_transaction", body)
            .await
    }

    /// Voids an unsettled transaction. Voids are deliberately outside the
    /// token-refresh wrapper: a stale token comes back in the returned
    /// result instead of triggering a replay.
    pub async fn void(
        &self,
        authorization_id: &str,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let body = self.transaction_content(paytrace::PaytraceTransactionIdRequest {
            transaction_id: authorization_id.to_string(),
        })?;
        let token = self.current_token().await;
        let outcome = self.commit("void", &body, &token).await?;
        Ok(outcome.into_result())
    }

    /// Validates a card with an authorization for a nominal amount followed
    /// by exactly one void attempt. The void is best effort and its outcome
    /// is discarded; card validity is decided by the authorization alone.
    pub async fn verify(
        &self,
        card: &Card,
        options: &PaymentOptions,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let authorization = self.authorize(VERIFY_AMOUNT, card, options).await?;
        let transaction_id = authorization.transaction_id.clone().unwrap_or_default();
        if let Err(error) = self.void(&transaction_id).await {
            tracing::warn!(?error, "failed to reverse verification authorization");
        }
        Ok(authorization)
    }

    /// Redacts card numbers, card security codes, bearer tokens and
    /// passwords from a captured wire transcript so it can be logged or
    /// stored.
    pub fn scrub(transcript: &str) -> String {
        TRANSCRIPT_FILTERS.iter().fold(
            transcript.to_string(),
            |transcript, filter| filter.replace_all(&transcript, "${1}[FILTERED]").into_owned(),
        )
    }

    async fn commit_with_token_refresh(
        &self,
        endpoint: &str,
        body: RequestContent,
    ) -> CustomResult<TransactionResult, ConnectorError> {
        let token = self.current_token().await;
        let outcome = self.commit(endpoint, &body, &token).await?;
        if !outcome.response.has_invalid_token_error() {
            return Ok(outcome.into_result());
        }

        self.refresh_access_token(&token).await?;
        let refreshed = self.current_token().await;
        let retried = self.commit(endpoint, &body, &refreshed).await?;
        Ok(retried.into_result())
    }

    async fn commit(
        &self,
        endpoint: &str,
        body: &RequestContent,
        token: &Secret<String>,
    ) -> CustomResult<paytrace::PaytraceCallOutcome, ConnectorError> {
        let url = format!("{}/v1/transactions/{endpoint}", self.config.base_url());
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&url)
            .headers(vec![
                ("Content-Type".to_string(), "application/json".into()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", token.peek()).into_masked(),
                ),
            ])
            .set_body(body.clone())
            .build();
        tracing::debug!(connector_request = ?request, endpoint, "submitting transaction request");

        let response = self
            .client
            .send_request(request)
            .await
            .change_context(ConnectorError::ProcessingStepFailed(None))?;
        let raw: serde_json::Value = response
            .response
            .parse_struct("PaytraceTransactionResponse")
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        let typed: paytrace::PaytraceTransactionResponse = serde_json::from_value(raw.clone())
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        tracing::info!(connector_response = ?typed, endpoint, status_code = response.status_code);

        Ok(paytrace::PaytraceCallOutcome {
            response: typed,
            raw,
        })
    }

    async fn current_token(&self) -> Secret<String> {
        self.access_token.read().await.clone()
    }

    /// Trades the configured credentials for a bearer token and stores it.
    ///
    /// Refreshes are single-flight: the exchange runs under the write guard,
    /// and a caller whose observed token has already been replaced skips the
    /// redundant round trip. A token response without an `access_token`
    /// field leaves the held token untouched; the next API call surfaces
    /// whatever the provider thinks of it.
    async fn refresh_access_token(
        &self,
        observed: &Secret<String>,
    ) -> CustomResult<(), ConnectorError> {
        let mut guard = self.access_token.write().await;
        if guard.peek() != observed.peek() {
            return Ok(());
        }
        if let Some(token) = self.request_access_token().await? {
            *guard = token;
        }
        Ok(())
    }

    async fn request_access_token(
        &self,
    ) -> CustomResult<Option<Secret<String>>, ConnectorError> {
        let body = RequestContent::form_url_encoded(&paytrace::PaytraceAccessTokenRequest {
            grant_type: "password",
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        })
        .change_context(ConnectorError::RequestEncodingFailed)?;
        let request = RequestBuilder::new()
            .method(Method::Post)
            .url(&format!("{}/oauth/token", self.config.base_url()))
            .headers(vec![
                ("Accept".to_string(), "*/*".into()),
                (
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded".into(),
                ),
            ])
            .set_body(body)
            .build();
        tracing::debug!("requesting access token");

        let response = self
            .client
            .send_request(request)
            .await
            .change_context(ConnectorError::ProcessingStepFailed(None))?;
        let token_response: paytrace::PaytraceAccessTokenResponse = response
            .response
            .parse_struct("PaytraceAccessTokenResponse")
            .change_context(ConnectorError::ResponseDeserializationFailed)?;
        Ok(token_response.access_token)
    }

    fn transaction_content<T: serde::Serialize>(
        &self,
        payload: T,
    ) -> CustomResult<RequestContent, ConnectorError> {
        let integrator_id =
            self.config
                .integrator_id
                .clone()
                .ok_or(ConnectorError::MissingRequiredField {
                    field_name: "integrator_id",
                })?;
        let body = paytrace::PaytraceTransactionBody {
            payload,
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            integrator_id,
        };
        RequestContent::json(&body).change_context(ConnectorError::RequestEncodingFailed)
    }
}

static TRANSCRIPT_FILTERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // card number and security code, quoted or bare
        r#"("number"\s*:\s*"?)[^",}]*"#,
        r#"("csc"\s*:\s*"?)[^",}]*"#,
        // credentials, in JSON bodies and in the form-encoded token request
        r#"("password"\s*:\s*"?)[^",}]*"#,
        r#"(password=)[^&\s"]*"#,
        r#"("access_token"\s*:\s*"?)[^",}]*"#,
        // bearer header values
        r#"(?i)(authorization:?\s*bearer\s+)[^\s"',]*"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});
