//! Applies load results to a [`PageStore`], logging superseded responses.

use torque_core::store::{Keyed, LoadOutcome, LoadTicket, PageStore};
use torque_core::table::Searchable;
use tracing::{debug, warn};

use crate::error::ClientResult;

/// Stores `result` if `ticket` is still the newest load.
///
/// A failed load that is still current is recorded on the store and returned;
/// a superseded one is dropped whatever its result.
pub fn apply_load<T: Searchable + Keyed>(
    store: &mut PageStore<T>,
    ticket: LoadTicket,
    result: ClientResult<Vec<T>>,
) -> ClientResult<LoadOutcome> {
    let outcome = match result {
        Ok(items) => store.finish_load(ticket, items),
        Err(err) => {
            let outcome = store.fail_load(ticket, err.to_string());
            if outcome == LoadOutcome::Applied {
                warn!(ticket = ticket.sequence(), error = %err, "Load failed");
                return Err(err);
            }
            outcome
        }
    };

    if let LoadOutcome::Superseded { ticket, latest } = outcome {
        debug!(
            ticket = ticket.sequence(),
            latest = latest.sequence(),
            "Discarding response of superseded load"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use torque_core::types::ServiceAdvisor;

    fn advisor(id: &str) -> ServiceAdvisor {
        ServiceAdvisor {
            advisor_id: id.to_string(),
            name: format!("Advisor {}", id),
            email: String::new(),
            phone: String::new(),
            department: String::new(),
            active_services: 0,
            available: true,
        }
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut store = PageStore::new(10);
        let stale = store.begin_load();
        let current = store.begin_load();

        let outcome = apply_load(&mut store, stale, Err(ClientError::Network("timeout".into()))).unwrap();
        assert!(matches!(outcome, LoadOutcome::Superseded { .. }));
        assert!(store.last_error().is_none());

        apply_load(&mut store, current, Ok(vec![advisor("1")])).unwrap();
        assert_eq!(store.table().total_len(), 1);
    }

    #[test]
    fn test_current_failure_is_recorded() {
        let mut store: PageStore<ServiceAdvisor> = PageStore::new(10);
        let ticket = store.begin_load();
        let err = apply_load(&mut store, ticket, Err(ClientError::Http { status: 500, message: "boom".into() }))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.last_error(), Some("HTTP 500: boom"));
    }
}
