use crate::error::{MqaError, Result};
use crate::query::QueryExecutor;
use crate::types::indicator::EntityType;
use crate::types::report::Populations;

/// Executor handle plus the entity populations, counted once when opened.
pub struct CatalogSession {
    executor: Box<dyn QueryExecutor>,
    datasets: u64,
    distributions: u64,
}

impl CatalogSession {
    /// Counts both populations up front; any failure here is fatal.
    pub fn open(executor: Box<dyn QueryExecutor>) -> Result<Self> {
        let datasets = count_population(executor.as_ref(), EntityType::Dataset)?;
        let distributions = count_population(executor.as_ref(), EntityType::Distribution)?;
        tracing::info!(
            endpoint = %executor.describe(),
            datasets,
            distributions,
            "catalog session opened"
        );
        Ok(Self {
            executor,
            datasets,
            distributions,
        })
    }

    pub fn population(&self, entity: EntityType) -> u64 {
        match entity {
            EntityType::Dataset => self.datasets,
            EntityType::Distribution => self.distributions,
        }
    }

    pub fn populations(&self) -> Populations {
        Populations {
            datasets: self.datasets,
            distributions: self.distributions,
        }
    }

    pub fn executor(&self) -> &dyn QueryExecutor {
        self.executor.as_ref()
    }
}

fn count_population(executor: &dyn QueryExecutor, entity: EntityType) -> Result<u64> {
    executor
        .count(entity)
        .map_err(|err| MqaError::Session(format!("counting {entity}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::GroupedValue;
    use crate::types::indicator::Property;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingExecutor {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl QueryExecutor for CountingExecutor {
        fn count(&self, entity: EntityType) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MqaError::Query("endpoint unreachable".to_string()));
            }
            Ok(match entity {
                EntityType::Dataset => 10,
                EntityType::Distribution => 25,
            })
        }

        fn count_with_property(&self, _: EntityType, _: Property) -> Result<u64> {
            Ok(0)
        }

        fn grouped_values(&self, _: EntityType, _: Property) -> Result<Vec<GroupedValue>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn open_counts_populations_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = CatalogSession::open(Box::new(CountingExecutor {
            calls: Arc::clone(&calls),
            fail: false,
        }))
        .expect("session should open");

        assert_eq!(session.population(EntityType::Dataset), 10);
        assert_eq!(session.population(EntityType::Distribution), 25);
        assert_eq!(session.population(EntityType::Dataset), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn open_fails_when_population_query_fails() {
        let result = CatalogSession::open(Box::new(CountingExecutor {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }));
        let err = result.err().expect("session should not open");
        assert!(matches!(err, MqaError::Session(_)));
        assert!(err.to_string().contains("dcat:Dataset"));
    }
}
