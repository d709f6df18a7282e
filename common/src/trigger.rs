//! Deciding which webhooks fire for a given rate table.

use crate::models::{ConversionResult, RateTable, WebhookRegistration};
use tracing::{debug, warn};

/// When a registration should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fire only when the rate is outside the registration's band. Used
    /// after each ingestion cycle.
    OutOfBand,
    /// Fire for every registration regardless of band. Used by the
    /// on-demand evaluation endpoint.
    Always,
}

/// A registration that should be notified, with the rate that triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub registration: WebhookRegistration,
    pub conversion: ConversionResult,
}

/// Evaluate every registration against `table`.
///
/// Registrations whose pair cannot be converted are skipped with a warning.
pub fn evaluate(
    table: &RateTable,
    registrations: &[WebhookRegistration],
    mode: TriggerMode,
) -> Vec<Firing> {
    let mut firings = Vec::new();

    for registration in registrations {
        let conversion =
            match table.cross_rate(&registration.base_currency, &registration.target_currency) {
                Ok(conversion) => conversion,
                Err(e) => {
                    warn!(
                        "Skipping webhook {} ({}/{}): {}",
                        registration.id, registration.base_currency, registration.target_currency, e
                    );
                    continue;
                }
            };

        let fire = match mode {
            TriggerMode::Always => true,
            TriggerMode::OutOfBand => registration.is_out_of_band(conversion.rate),
        };

        if fire {
            firings.push(Firing {
                registration: registration.clone(),
                conversion,
            });
        } else {
            debug!(
                "Webhook {} within band [{}, {}] at {}",
                registration.id,
                registration.min_trigger_value,
                registration.max_trigger_value,
                conversion.rate
            );
        }
    }

    firings
}
