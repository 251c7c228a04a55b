//! Ordering for autocomplete responses.
//!
//! Suggestion requests are not cancelled when the user keeps typing. Each
//! request takes a ticket; a response is only shown if its ticket is still
//! the latest one issued.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{model::CitySuggestion, report::WeatherSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct SuggestionSequencer {
    latest: AtomicU64,
}

impl SuggestionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Looks up suggestions for `query`, returning `None` when a newer query
    /// was issued before this one's response arrived.
    pub async fn lookup<S>(&self, source: &S, query: &str) -> Option<Vec<CitySuggestion>>
    where
        S: WeatherSource + ?Sized,
    {
        let ticket = self.issue();
        let found = source.city_suggestions(query).await;

        if self.is_current(ticket) {
            Some(found)
        } else {
            tracing::debug!(query, "discarding superseded suggestions");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, WeatherError};
    use crate::model::{Coordinates, CurrentConditions, Forecast};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Answers "pa" only once released; any other query answers at once.
    struct HeldSource {
        release: Notify,
    }

    #[async_trait]
    impl WeatherSource for HeldSource {
        async fn current_conditions(&self, _city: &str) -> Result<CurrentConditions> {
            Err(WeatherError::EmptyCity)
        }

        async fn forecast(&self, _city: &str) -> Result<Forecast> {
            Err(WeatherError::EmptyCity)
        }

        async fn conditions_by_coordinates(&self, _coords: Coordinates) -> Result<CurrentConditions> {
            Err(WeatherError::EmptyCity)
        }

        async fn city_suggestions(&self, query: &str) -> Vec<CitySuggestion> {
            if query == "pa" {
                self.release.notified().await;
            }
            vec![CitySuggestion {
                name: query.to_string(),
                country: "FR".into(),
                coordinates: Coordinates::new(48.85, 2.35),
            }]
        }
    }

    #[tokio::test]
    async fn slow_older_lookup_is_dropped_when_newer_one_finished_first() {
        let seq = SuggestionSequencer::new();
        let source = HeldSource {
            release: Notify::new(),
        };

        let (older, newer) = tokio::join!(seq.lookup(&source, "pa"), async {
            let newer = seq.lookup(&source, "par").await;
            source.release.notify_one();
            newer
        });

        assert_eq!(older, None);
        let newer = newer.expect("latest lookup is shown");
        assert_eq!(newer[0].name, "par");
    }

    #[tokio::test]
    async fn uncontested_lookup_is_returned() {
        let seq = SuggestionSequencer::new();
        let source = HeldSource {
            release: Notify::new(),
        };

        let found = seq.lookup(&source, "lon").await.expect("only lookup");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let seq = SuggestionSequencer::new();
        let first = seq.issue();
        assert!(seq.is_current(first));

        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }
}
