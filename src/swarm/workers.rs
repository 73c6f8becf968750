use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::utils::SwarmError;

/// Shared-memory execution context threaded explicitly through the force field.
///
/// Owns a dedicated rayon pool; nothing reads a process-wide thread count.
/// With a single thread the kernels take their serial path and the pool is
/// never entered.
pub struct WorkerContext {
    threads: usize,
    pool: Option<ThreadPool>,
}

impl WorkerContext {
    /// Creates a context with `threads` workers.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_swarm::swarm::WorkerContext;
    ///
    /// let workers = WorkerContext::new(2).unwrap();
    /// assert!(workers.is_parallel());
    /// assert_eq!(workers.install(|| 1 + 1), 2);
    /// ```
    pub fn new(threads: usize) -> Result<Self, SwarmError> {
        if threads == 0 {
            return Err(SwarmError::InvalidConfig("thread count must be at least 1".to_string()));
        }
        if threads == 1 {
            return Ok(Self::serial());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("swarm-worker-{}", i))
            .build()
            .map_err(|e| SwarmError::InvalidConfig(format!("cannot start worker pool: {}", e)))?;
        debug!("started worker pool with {} threads", threads);
        Ok(Self { threads, pool: Some(pool) })
    }

    /// A context that runs everything on the calling thread.
    pub fn serial() -> Self {
        Self { threads: 1, pool: None }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Runs `op` inside the pool so that nested rayon calls use its workers.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("WorkerContext").field("threads", &self.threads).finish()
    }
}
