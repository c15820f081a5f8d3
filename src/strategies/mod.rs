pub mod random;
pub mod round_robin;
pub mod strategy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use random::RandomStrategy;
pub use round_robin::RoundRobinStrategy;
pub use strategy::SelectionStrategy;

/// Which selection algorithm a handler uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    #[serde(alias = "rr")]
    RoundRobin,
    Random,
}

/// Strategy configuration: the algorithm plus its seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,

    #[serde(default)]
    pub seed: u64,
}

impl StrategyConfig {
    pub fn build(&self) -> Arc<dyn SelectionStrategy> {
        match self.kind {
            StrategyKind::RoundRobin => Arc::new(RoundRobinStrategy::new(self.seed)),
            StrategyKind::Random => Arc::new(RandomStrategy::new(self.seed)),
        }
    }
}
