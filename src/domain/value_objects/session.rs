use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::checkout_types::CheckoutType;

/// Ephemeral per-attempt session data held in the fast lookup cache.
///
/// Presence of the key is the signal that the attempt is still awaitable;
/// deleting it is the claim that gates terminal transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheSessionEntry {
    pub ref_id: String,
    pub inv_id: String,
    pub checkout_type: CheckoutType,
    /// Processor reference returned when the charge was accepted
    /// (absent for hosted checkout, which only hands back a link).
    pub processor_ref: Option<String>,
    /// The merchant transaction reference submitted with the charge.
    pub processor_tx_ref: String,
    /// Asynchronous transaction identifier, attached once a callback
    /// reports the charge completed.
    pub transaction_id: Option<String>,
}
