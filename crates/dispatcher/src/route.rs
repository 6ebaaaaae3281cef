//! Route - one destination together with its tag rule

use std::fmt;

use contracts::Destination;

use crate::metrics::DestinationMetrics;
use crate::tag_rule::TagRule;

/// A configured destination slot
pub struct Route {
    destination: Box<dyn Destination>,
    rule: TagRule,
    metrics: DestinationMetrics,
}

impl Route {
    /// Pair a destination with its rule
    pub fn new(destination: Box<dyn Destination>, rule: TagRule) -> Self {
        Self {
            destination,
            rule,
            metrics: DestinationMetrics::new(),
        }
    }

    /// Destination name
    pub fn name(&self) -> &str {
        self.destination.name()
    }

    pub fn destination(&self) -> &dyn Destination {
        self.destination.as_ref()
    }

    pub fn rule(&self) -> &TagRule {
        &self.rule
    }

    pub fn metrics(&self) -> &DestinationMetrics {
        &self.metrics
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("destination", &self.name())
            .field("rule", &self.rule)
            .field("metrics", &self.metrics)
            .finish()
    }
}
