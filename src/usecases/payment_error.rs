use axum::http::StatusCode;
use thiserror::Error;

use crate::payments::gateway::GatewayError;

/// Failure taxonomy for the payment surface. Every gateway or storage error
/// is folded into one of these before it can reach a caller.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("No matching invoice found, check invoice ID")]
    InvoiceNotFound,

    #[error("Invoice not assigned to active user")]
    NotInvoiceRecipient,

    #[error("Invoice already paid")]
    InvoiceAlreadyPaid,

    #[error("Invoice has expired, can't process payment")]
    InvoiceExpired,

    #[error("payment attempt {0} is still open for this invoice")]
    AttemptInProgress(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized access to resource")]
    Unauthorized,

    #[error("No payment record found")]
    RecordNotFound,

    #[error("ERROR: check internet connection")]
    GatewayUnreachable,

    #[error("payment processor took too long to respond")]
    GatewayTimeout,

    /// The processor answered and said no: declined charge, bad OTP,
    /// failed verification. Terminal for the attempt.
    #[error("{0}")]
    GatewayRejected(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvoiceNotFound | PaymentError::RecordNotFound => StatusCode::NOT_FOUND,
            PaymentError::NotInvoiceRecipient => StatusCode::FORBIDDEN,
            PaymentError::Unauthorized => StatusCode::UNAUTHORIZED,
            PaymentError::InvoiceAlreadyPaid
            | PaymentError::InvoiceExpired
            | PaymentError::Validation(_)
            | PaymentError::GatewayRejected(_) => StatusCode::BAD_REQUEST,
            PaymentError::AttemptInProgress(_) => StatusCode::CONFLICT,
            PaymentError::GatewayUnreachable => StatusCode::REQUEST_TIMEOUT,
            PaymentError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Transient errors left the attempt open; the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::GatewayUnreachable | PaymentError::GatewayTimeout
        )
    }
}

impl From<GatewayError> for PaymentError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ConnectTimeout | GatewayError::Connection => {
                PaymentError::GatewayUnreachable
            }
            GatewayError::ReadTimeout => PaymentError::GatewayTimeout,
            GatewayError::ChargeDeclined(msg)
            | GatewayError::ValidationFailed(msg)
            | GatewayError::VerificationFailed(msg) => PaymentError::GatewayRejected(msg),
            GatewayError::Unexpected(msg) => PaymentError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;
