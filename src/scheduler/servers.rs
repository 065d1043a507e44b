//! Per-stage server availability.
//!
//! Each stage keeps a fixed-size array of "next free" times, one slot per
//! server, indexed by server number. The pool is created fresh for every
//! build, so every run starts with all servers idle at time 0.

/// Next-free times of one stage's parallel servers.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerPool {
    next_free: Vec<f64>,
}

impl ServerPool {
    /// Creates a pool of `servers` idle servers (at least one).
    pub fn new(servers: usize) -> Self {
        Self {
            next_free: vec![0.0; servers.max(1)],
        }
    }

    /// Number of servers.
    pub fn len(&self) -> usize {
        self.next_free.len()
    }

    /// Always false: a pool holds at least one server.
    pub fn is_empty(&self) -> bool {
        self.next_free.is_empty()
    }

    /// Server that frees up first, as `(index, free_at)`.
    ///
    /// Ties go to the lowest index.
    pub fn earliest(&self) -> (usize, f64) {
        let mut best_idx = 0;
        let mut best = self.next_free[0];
        for (i, &t) in self.next_free.iter().enumerate().skip(1) {
            if t < best {
                best = t;
                best_idx = i;
            }
        }
        (best_idx, best)
    }

    /// Marks `server` busy until `finish`.
    pub fn occupy(&mut self, server: usize, finish: f64) {
        self.next_free[server] = finish;
    }
}
