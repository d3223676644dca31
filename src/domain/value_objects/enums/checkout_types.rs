use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The three entry points that can open a payment attempt. They share the
/// same reconciliation pipeline and differ only in the confirmation channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckoutType {
    BankTransfer,
    Card,
    HostedCheckout,
}

impl CheckoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutType::BankTransfer => "bank_transfer",
            CheckoutType::Card => "card",
            CheckoutType::HostedCheckout => "hosted_checkout",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "bank_transfer" => Some(CheckoutType::BankTransfer),
            "card" => Some(CheckoutType::Card),
            "hosted_checkout" => Some(CheckoutType::HostedCheckout),
            _ => None,
        }
    }

    /// Human label persisted on the attempt record.
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutType::BankTransfer => "Bank Transfer",
            CheckoutType::Card => "Card",
            CheckoutType::HostedCheckout => "Hosted Checkout",
        }
    }
}

impl Display for CheckoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
