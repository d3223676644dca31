use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::config_model::Gateway as GatewayConfig;
use crate::domain::value_objects::payments::CardDetails;

/// Extra attempts for the idempotent verification call; charges are never
/// retried automatically.
const VERIFY_RETRIES: u32 = 2;
const VERIFY_RETRY_BACKOFF_MS: u64 = 300;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("could not open a connection to the payment processor")]
    ConnectTimeout,
    #[error("payment processor took too long to respond")]
    ReadTimeout,
    #[error("connection to the payment processor failed")]
    Connection,
    #[error("{0}")]
    ChargeDeclined(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    VerificationFailed(String),
    #[error("unexpected processor response: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Transient failures are safe to retry and must never move an attempt
    /// to a terminal status.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectTimeout | GatewayError::ReadTimeout | GatewayError::Connection
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone)]
pub struct ChargeCustomer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct BankTransferCharge {
    pub processor_ref: String,
    pub processor_tx_ref: String,
    pub bank_name: String,
    pub bank_account: String,
    pub expires_in: i64,
    pub transfer_note: String,
}

#[derive(Debug, Clone)]
pub struct CardCharge {
    pub processor_ref: String,
    pub processor_tx_ref: String,
    pub suggested_auth: Option<String>,
    pub validation_required: bool,
}

#[derive(Debug, Clone)]
pub struct CheckoutLink {
    pub status: String,
    pub link: String,
    pub link_type: String,
}

#[derive(Debug, Clone)]
pub struct OtpValidation {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub status: String,
    pub amount: Decimal,
    pub charged_amount: Decimal,
    pub currency: String,
    pub processor_transaction_ref: String,
}

impl VerificationResult {
    pub fn is_successful(&self) -> bool {
        self.status == "successful"
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_bank_transfer_charge(
        &self,
        customer: &ChargeCustomer,
        amount: Decimal,
        tx_ref: &str,
    ) -> GatewayResult<BankTransferCharge>;

    async fn create_card_charge(
        &self,
        customer: &ChargeCustomer,
        card: &CardDetails,
        amount: Decimal,
        tx_ref: &str,
        suggested_auth: Option<String>,
    ) -> GatewayResult<CardCharge>;

    async fn validate_card_otp(&self, processor_ref: &str, otp: &str)
    -> GatewayResult<OtpValidation>;

    async fn create_checkout_link(
        &self,
        customer: &ChargeCustomer,
        amount: Decimal,
        tx_ref: &str,
    ) -> GatewayResult<CheckoutLink>;

    async fn verify_by_reference(&self, tx_ref: &str) -> GatewayResult<VerificationResult>;
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct BankTransferData {
    #[serde(rename = "flwRef")]
    flw_ref: String,
    #[serde(rename = "txRef")]
    tx_ref: String,
    #[serde(rename = "bankName")]
    bank_name: String,
    #[serde(rename = "accountNumber")]
    account_number: String,
    #[serde(rename = "expiresIn")]
    expires_in: i64,
    #[serde(rename = "transferNote")]
    transfer_note: String,
}

#[derive(Debug, Deserialize)]
struct CardChargeData {
    #[serde(rename = "flwRef")]
    flw_ref: String,
    #[serde(rename = "txRef")]
    tx_ref: String,
    #[serde(rename = "suggestedAuth")]
    suggested_auth: Option<String>,
    #[serde(rename = "validationRequired", default)]
    validation_required: bool,
}

#[derive(Debug, Deserialize)]
struct CheckoutLinkData {
    link: String,
}

#[derive(Debug, Deserialize)]
struct ValidateChargeData {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerificationData {
    id: i64,
    status: String,
    amount: Decimal,
    charged_amount: Decimal,
    currency: String,
}

/// Client for the payment processor's REST API. Every call carries explicit
/// connect and read timeouts so "processor is down" and "processor is slow"
/// stay distinguishable at the call site.
pub struct FlutterwaveClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
    redirect_url: String,
    currency: String,
}

impl FlutterwaveClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.read_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            redirect_url: config.redirect_url.clone(),
            currency: config.currency.clone(),
        })
    }

    fn classify_transport(err: reqwest::Error) -> GatewayError {
        if err.is_connect() {
            GatewayError::ConnectTimeout
        } else if err.is_timeout() {
            GatewayError::ReadTimeout
        } else {
            GatewayError::Connection
        }
    }

    /// Reads the response body and rejects non-2xx answers, logging the
    /// processor's error envelope before mapping it through `reject`.
    async fn read_envelope<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        context: &str,
        reject: fn(String) -> GatewayError,
    ) -> GatewayResult<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(Self::classify_transport)?;

        if !status.is_success() {
            error!(
                status = %status,
                response_body = %body,
                context = %context,
                "payment processor request failed"
            );
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("processor rejected request: {}", context));
            return Err(reject(message));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|err| {
            error!(
                parse_error = %err,
                response_body = %body,
                context = %context,
                "payment processor returned an unreadable envelope"
            );
            GatewayError::Unexpected(format!("unreadable envelope for {}", context))
        })?;

        if envelope.status != "success" {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("processor reported {}", envelope.status));
            warn!(
                processor_status = %envelope.status,
                processor_message = %message,
                context = %context,
                "payment processor reported a non-success envelope"
            );
            return Err(reject(message));
        }

        envelope
            .data
            .ok_or_else(|| GatewayError::Unexpected(format!("missing data for {}", context)))
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveClient {
    async fn create_bank_transfer_charge(
        &self,
        customer: &ChargeCustomer,
        amount: Decimal,
        tx_ref: &str,
    ) -> GatewayResult<BankTransferCharge> {
        let payload = json!({
            "tx_ref": tx_ref,
            "amount": amount,
            "currency": self.currency,
            "email": customer.email,
            "fullname": customer.name,
        });

        let resp = self
            .http
            .post(format!("{}/charges?type=bank_transfer", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let data: BankTransferData =
            Self::read_envelope(resp, "bank transfer charge", GatewayError::ChargeDeclined)
                .await?;

        Ok(BankTransferCharge {
            processor_ref: data.flw_ref,
            processor_tx_ref: data.tx_ref,
            bank_name: data.bank_name,
            bank_account: data.account_number,
            expires_in: data.expires_in,
            transfer_note: data.transfer_note,
        })
    }

    async fn create_card_charge(
        &self,
        customer: &ChargeCustomer,
        card: &CardDetails,
        amount: Decimal,
        tx_ref: &str,
        suggested_auth: Option<String>,
    ) -> GatewayResult<CardCharge> {
        let mut payload = json!({
            "tx_ref": tx_ref,
            "amount": amount,
            "currency": self.currency,
            "email": customer.email,
            "fullname": customer.name,
            "cardno": card.cardno,
            "expirymonth": card.expirymonth,
            "expiryyear": card.expiryyear,
            "cvv": card.cvv,
            "pin": card.pin,
        });
        if let Some(auth_mode) = suggested_auth {
            payload["suggested_auth"] = json!(auth_mode);
        }

        let resp = self
            .http
            .post(format!("{}/charges?type=card", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let data: CardChargeData =
            Self::read_envelope(resp, "card charge", GatewayError::ChargeDeclined).await?;

        Ok(CardCharge {
            processor_ref: data.flw_ref,
            processor_tx_ref: data.tx_ref,
            suggested_auth: data.suggested_auth,
            validation_required: data.validation_required,
        })
    }

    async fn validate_card_otp(
        &self,
        processor_ref: &str,
        otp: &str,
    ) -> GatewayResult<OtpValidation> {
        let payload = json!({
            "transaction_reference": processor_ref,
            "otp": otp,
        });

        let resp = self
            .http
            .post(format!("{}/validate_charge", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let data: ValidateChargeData =
            Self::read_envelope(resp, "otp validation", GatewayError::ValidationFailed).await?;

        Ok(OtpValidation {
            message: data.message.unwrap_or_else(|| "Charge validated".to_string()),
        })
    }

    async fn create_checkout_link(
        &self,
        customer: &ChargeCustomer,
        amount: Decimal,
        tx_ref: &str,
    ) -> GatewayResult<CheckoutLink> {
        let payload = json!({
            "tx_ref": tx_ref,
            "amount": amount,
            "currency": self.currency,
            "redirect_url": self.redirect_url,
            "customer": {
                "name": customer.name,
                "email": customer.email,
            },
        });

        let resp = self
            .http
            .post(format!("{}/payments", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Self::classify_transport)?;

        if !status.is_success() {
            error!(
                status = %status,
                response_body = %body,
                "hosted checkout link request failed"
            );
            return Err(GatewayError::ChargeDeclined(
                "processor rejected hosted checkout request".to_string(),
            ));
        }

        let envelope: ApiEnvelope<CheckoutLinkData> =
            serde_json::from_str(&body).map_err(|err| {
                error!(parse_error = %err, response_body = %body, "unreadable checkout envelope");
                GatewayError::Unexpected("unreadable envelope for hosted checkout".to_string())
            })?;

        if envelope.status != "success" {
            let message = envelope
                .message
                .unwrap_or_else(|| "processor rejected hosted checkout request".to_string());
            return Err(GatewayError::ChargeDeclined(message));
        }

        let link_type = envelope
            .message
            .unwrap_or_else(|| "Hosted Link".to_string());
        let data = envelope
            .data
            .ok_or_else(|| GatewayError::Unexpected("missing checkout link".to_string()))?;

        Ok(CheckoutLink {
            status: "success".to_string(),
            link: data.link,
            link_type,
        })
    }

    async fn verify_by_reference(&self, tx_ref: &str) -> GatewayResult<VerificationResult> {
        let mut attempt = 0;
        loop {
            let sent = self
                .http
                .get(format!(
                    "{}/transactions/verify_by_reference",
                    self.base_url
                ))
                .query(&[("tx_ref", tx_ref)])
                .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
                .send()
                .await
                .map_err(Self::classify_transport);

            let resp = match sent {
                Ok(resp) => resp,
                Err(err) if err.is_transient() && attempt < VERIFY_RETRIES => {
                    attempt += 1;
                    warn!(
                        tx_ref,
                        attempt,
                        error = %err,
                        "transient verification failure, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(
                        VERIFY_RETRY_BACKOFF_MS * u64::from(attempt),
                    ))
                    .await;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let data: VerificationData =
                Self::read_envelope(resp, "verify transaction", GatewayError::VerificationFailed)
                    .await?;

            return Ok(VerificationResult {
                processor_transaction_ref: data.id.to_string(),
                status: data.status,
                amount: data.amount,
                charged_amount: data.charged_amount,
                currency: data.currency,
            });
        }
    }
}
