//! Error types shared across the connector.

/// Result type alias carrying an [`error_stack::Report`] as the error.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Failures surfaced by the gateway client itself.
///
/// Provider-side declines are not errors: they come back as a
/// [`TransactionResult`](crate::types::TransactionResult) with
/// `success == false`. This enum covers the conditions that leave no result
/// to hand back.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConnectorError {
    #[error("Failed to encode connector request")]
    RequestEncodingFailed,
    #[error("Failed to deserialize connector response")]
    ResponseDeserializationFailed,
    #[error("Failed to execute a processing step: {0:?}")]
    ProcessingStepFailed(Option<bytes::Bytes>),
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
}

/// Low-level encode/decode failures.
#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),
    #[error("Failed to serialize to {0} format")]
    EncodeError(&'static str),
}

/// Failures raised by the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("Error while constructing the http client")]
    ClientConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("Error while sending the request")]
    RequestNotSent,
    #[error("Error while receiving the response body")]
    ResponseDecodingFailed,
}
