//! Reuse cache for short-lived entities
//!
//! `get` hands out an idle instance (reset) before constructing a new one.
//! The pool does not track borrows: every instance taken during a run must be
//! released exactly once, and double-release is the caller's problem.

/// Object pool with a factory and a reinitialization routine
pub struct Pool<T> {
    idle: Vec<T>,
    factory: Box<dyn FnMut() -> T>,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    /// Create a pool and pre-fill it with `prewarm` fresh instances
    pub fn new(factory: impl FnMut() -> T + 'static, reset: fn(&mut T), prewarm: usize) -> Self {
        let mut pool = Self {
            idle: Vec::with_capacity(prewarm),
            factory: Box::new(factory),
            reset,
        };
        for _ in 0..prewarm {
            let item = (pool.factory)();
            pool.release(item);
        }
        pool
    }

    pub fn get(&mut self) -> T {
        match self.idle.pop() {
            Some(mut item) => {
                (self.reset)(&mut item);
                item
            }
            None => (self.factory)(),
        }
    }

    pub fn release(&mut self, item: T) {
        self.idle.push(item);
    }

    /// Number of idle instances
    pub fn idle(&self) -> usize {
        self.idle.len()
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").field("idle", &self.idle.len()).finish()
    }
}
