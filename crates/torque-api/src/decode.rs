//! Response decoding shared by the directory services.
//!
//! CRUD endpoints answer either with the entity itself or with the entity
//! wrapped under `data`; lists may be bare arrays or wrapped too. Entities
//! are read through the normalizers in `torque_core::normalizer`.

use serde_json::Value;
use torque_core::normalizer::ListOutcome;
use tracing::warn;

/// The entity inside a `{ "data": … }` envelope, or the value itself.
pub(crate) fn unwrap_data(raw: &Value) -> &Value {
    match raw.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => raw,
    }
}

/// Logs the entries a normalizer had to drop.
pub(crate) fn report_rejected<T>(outcome: ListOutcome<T>, context: &str) -> Vec<T> {
    for rejected in &outcome.rejected {
        warn!(%context, error = %rejected, "Skipping unusable entry");
    }
    outcome.items
}
