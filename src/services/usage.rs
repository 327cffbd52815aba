//! Usage counter
//!
//! Increments and decrements `times_used` on any reference entity through the
//! `Rankable` capability.

use std::fmt;

use tracing::warn;

use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Rankable;

/// Change applied to a usage counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDelta {
    Increment,
    Decrement,
}

/// What to do when a counter would drop below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsagePolicy {
    /// Clamp at zero and report an anomaly
    #[default]
    Clamp,
    /// Abort the mutation
    Strict,
}

impl UsagePolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.strict_usage_counters {
            UsagePolicy::Strict
        } else {
            UsagePolicy::Clamp
        }
    }
}

/// A decrement that hit a counter already at zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageAnomaly {
    pub kind: &'static str,
    pub identifier: String,
}

impl fmt::Display for UsageAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} usage counter was already zero",
            self.kind, self.identifier
        )
    }
}

/// Add `delta` to the entity's usage counter
///
/// Returns the anomaly when a decrement was clamped.
pub fn bump<E: Rankable>(
    entity: &mut E,
    delta: UsageDelta,
    policy: UsagePolicy,
) -> LedgerResult<Option<UsageAnomaly>> {
    let current = entity.times_used();

    match delta {
        UsageDelta::Increment => {
            entity.set_times_used(current.saturating_add(1));
            Ok(None)
        }
        UsageDelta::Decrement if current > 0 => {
            entity.set_times_used(current - 1);
            Ok(None)
        }
        UsageDelta::Decrement => match policy {
            UsagePolicy::Strict => Err(LedgerError::UsageUnderflow {
                kind: E::ENTITY,
                identifier: entity.id().to_string(),
            }),
            UsagePolicy::Clamp => {
                let anomaly = UsageAnomaly {
                    kind: E::ENTITY,
                    identifier: entity.id().to_string(),
                };
                warn!(kind = anomaly.kind, id = %anomaly.identifier, "usage counter clamped at zero");
                Ok(Some(anomaly))
            }
        },
    }
}
