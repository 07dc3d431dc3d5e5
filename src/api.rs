//! The high-level engine facade.

use log::debug;

use crate::compose;
use crate::config::{EngineConfig, Strategy};
use crate::error::Result;
use crate::map::{map_partitioned, map_sequential};
use crate::partition::{Granularity, PartitionPolicy};
use crate::reduce::{reduce_partitioned, reduce_sequential};
use crate::tree::{Branch, DataTree};
use crate::validation::{ErrorChecker, Pair};
use crate::zip::{zip_lazy, zip_nested, zip_partitioned, zip_sequential, zip_strict};

/// The main entry point: an engine running every operation with one
/// configuration.
///
/// Each call builds a fresh output tree. The topology is computed on the
/// calling thread, the content is filled in parallel (inside the engine's
/// own thread pool, if one was configured), and the call returns once every
/// task has joined.
#[derive(Debug)]
pub struct Partree {
    config: EngineConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Partree {
    /// An engine with default settings on rayon's global pool.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            pool: None,
        }
    }

    /// Starts a builder.
    pub fn builder() -> PartreeBuilder {
        PartreeBuilder::default()
    }

    /// Builds an engine from a config value, creating a dedicated pool when
    /// `threads` is set.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("partree-{i}"))
                    .build()?,
            ),
            None => None,
        };
        debug!("engine: {config:?}");
        Ok(Self { config, pool })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active strategy.
    pub fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Broadcasting zip of `a` and `b`.
    ///
    /// Under [`Strategy::Nested`] the checker is not consulted.
    pub fn zip<'a, T, Q, R, F>(
        &self,
        a: &'a DataTree<T>,
        b: &'a DataTree<Q>,
        f: F,
        checker: &ErrorChecker<Pair<'a, T, Q>>,
    ) -> DataTree<R>
    where
        T: Sync,
        Q: Sync,
        R: Send,
        F: Fn(&T, &Q) -> R + Send + Sync,
    {
        let settings = self.config.partition_settings();
        match self.config.strategy {
            Strategy::Sequential => zip_sequential(a, b, f, checker),
            Strategy::Lazy => zip_lazy(a, b, f, checker),
            Strategy::Partitioned => {
                self.install(|| zip_partitioned(a, b, f, checker, settings))
            }
            Strategy::Nested => self.install(|| zip_nested(a, b, f)),
        }
    }

    /// Positional zip without broadcasting or validation.
    pub fn zip_strict<T, Q, R, F>(&self, a: &DataTree<T>, b: &DataTree<Q>, f: F) -> DataTree<R>
    where
        F: Fn(&T, &Q) -> R,
    {
        zip_strict(a, b, f)
    }

    /// Structure-preserving map.
    pub fn map<T, R, F>(&self, tree: &DataTree<T>, f: F, checker: &ErrorChecker<T>) -> DataTree<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        match self.config.strategy {
            Strategy::Sequential | Strategy::Lazy => map_sequential(tree, f, checker),
            Strategy::Partitioned | Strategy::Nested => {
                let settings = self.config.partition_settings();
                self.install(|| map_partitioned(tree, f, checker, settings))
            }
        }
    }

    /// One value per branch.
    pub fn reduce<T, R, F>(
        &self,
        tree: &DataTree<T>,
        f: F,
        checker: &ErrorChecker<Branch<T>>,
    ) -> DataTree<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&Branch<T>) -> R + Send + Sync,
    {
        match self.config.strategy {
            Strategy::Sequential | Strategy::Lazy => reduce_sequential(tree, f, checker),
            Strategy::Partitioned | Strategy::Nested => {
                let settings = self.config.partition_settings();
                self.install(|| reduce_partitioned(tree, f, checker, settings))
            }
        }
    }

    /// Broadcasting zip of three trees, composed from two 2-ary zips.
    pub fn zip3<'a, T, Q, U, R, F>(
        &self,
        a: &'a DataTree<T>,
        b: &'a DataTree<Q>,
        c: &'a DataTree<U>,
        f: F,
        checker: &ErrorChecker<compose::Triple<'a, T, Q, U>>,
    ) -> DataTree<R>
    where
        T: Sync,
        Q: Sync,
        U: Sync,
        R: Send,
        F: Fn(&T, &Q, &U) -> R + Send + Sync,
    {
        compose::zip3(self, a, b, c, f, checker)
    }
}

impl Default for Partree {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Partree`].
#[derive(Debug, Clone, Default)]
pub struct PartreeBuilder {
    config: EngineConfig,
}

impl PartreeBuilder {
    /// Sets the execution strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Fixed element budget per partition.
    pub fn granularity(mut self, granularity: usize) -> Self {
        self.config.granularity = Granularity::Fixed(granularity);
        self
    }

    /// Budget derived from the input size and the worker count.
    pub fn auto_granularity(mut self) -> Self {
        self.config.granularity = Granularity::Auto;
        self
    }

    /// Sets the partition policy.
    pub fn partition_policy(mut self, policy: PartitionPolicy) -> Self {
        self.config.partition_policy = policy;
        self
    }

    /// Runs on a dedicated pool of `n` threads.
    pub fn threads(mut self, n: usize) -> Self {
        self.config.threads = Some(n);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> Result<Partree> {
        Partree::from_config(self.config)
    }
}
