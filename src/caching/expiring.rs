//! Time-expiring decorator strategy

use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::CacheStrategy;
use crate::error::{ExternalizedPropertiesError, Result};

/// Decorates a strategy so that every entry expires a fixed time after it was cached.
///
/// A single sweeper thread per strategy removes entries as their deadlines pass. Caching
/// a key again restarts its lifetime. Reads also check the deadline, so an elapsed entry
/// is never served even if the sweeper has not run yet. Reads of live entries never touch
/// the schedule lock.
pub struct ExpiringCacheStrategy<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    shared: Arc<Shared<K, V>>,
    sweeper: Option<JoinHandle<()>>,
}

struct Shared<K, V> {
    inner: Arc<dyn CacheStrategy<K, V>>,
    lifetime: Duration,
    // Written only while `schedule` is held
    deadlines: DashMap<K, Timer>,
    schedule: Mutex<Schedule<K>>,
    wakeup: Condvar,
}

struct Schedule<K> {
    timers: BTreeMap<Timer, K>,
    next_generation: u64,
    shutdown: bool,
}

/// Deadline plus a generation so that re-caching never lets an older timer fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    deadline: Instant,
    generation: u64,
}

impl<K> Schedule<K>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_generation: 0,
            shutdown: false,
        }
    }

    fn schedule(&mut self, deadlines: &DashMap<K, Timer>, key: K, deadline: Instant) {
        let timer = Timer {
            deadline,
            generation: self.next_generation,
        };
        self.next_generation += 1;

        if let Some(previous) = deadlines.insert(key.clone(), timer) {
            self.timers.remove(&previous);
        }
        self.timers.insert(timer, key);
    }

    fn cancel(&mut self, deadlines: &DashMap<K, Timer>, key: &K) {
        if let Some((_, timer)) = deadlines.remove(key) {
            self.timers.remove(&timer);
        }
    }

    fn clear(&mut self, deadlines: &DashMap<K, Timer>) {
        deadlines.clear();
        self.timers.clear();
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.timers.keys().next().map(|timer| timer.deadline)
    }

    fn take_due(&mut self, deadlines: &DashMap<K, Timer>, now: Instant) -> Vec<K> {
        let mut due = Vec::new();
        while let Some(entry) = self.timers.first_entry() {
            if entry.key().deadline > now {
                break;
            }
            let key = entry.remove();
            deadlines.remove(&key);
            due.push(key);
        }
        due
    }
}

impl<K, V> ExpiringCacheStrategy<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Decorate `inner` so that entries expire `lifetime` after being cached
    pub fn new(inner: Arc<dyn CacheStrategy<K, V>>, lifetime: Duration) -> Result<Self> {
        if lifetime.is_zero() {
            return Err(ExternalizedPropertiesError::configuration(
                "Cache duration must be greater than zero",
            ));
        }

        let shared = Arc::new(Shared {
            inner,
            lifetime,
            deadlines: DashMap::new(),
            schedule: Mutex::new(Schedule::new()),
            wakeup: Condvar::new(),
        });

        let worker = shared.clone();
        let sweeper = thread::Builder::new()
            .name("expiring-cache-sweeper".to_string())
            .spawn(move || worker.sweep())
            .map_err(|e| {
                ExternalizedPropertiesError::configuration_with_source(
                    "Failed to start cache expiry thread",
                    e,
                )
            })?;

        Ok(Self {
            shared,
            sweeper: Some(sweeper),
        })
    }

    /// Lifetime of every cached entry
    pub fn lifetime(&self) -> Duration {
        self.shared.lifetime
    }
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
{
    fn sweep(&self) {
        let mut schedule = self.schedule.lock();
        loop {
            if schedule.shutdown {
                return;
            }

            match schedule.next_deadline() {
                Some(deadline) if deadline <= Instant::now() => {
                    for key in schedule.take_due(&self.deadlines, Instant::now()) {
                        self.inner.expire(&key);
                    }
                }
                Some(deadline) => {
                    self.wakeup.wait_until(&mut schedule, deadline);
                }
                None => {
                    self.wakeup.wait(&mut schedule);
                }
            }
        }
    }

    fn is_elapsed(&self, key: &K, now: Instant) -> bool {
        self.deadlines
            .get(key)
            .is_some_and(|timer| timer.deadline <= now)
    }
}

impl<K, V> CacheStrategy<K, V> for ExpiringCacheStrategy<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn cache(&self, key: K, value: V) {
        // Schedule lock is held across the insert so the sweeper cannot interleave
        let mut schedule = self.shared.schedule.lock();
        self.shared.inner.cache(key.clone(), value);
        let wake = schedule.next_deadline().is_none();
        schedule.schedule(&self.shared.deadlines, key, Instant::now() + self.shared.lifetime);
        if wake {
            self.shared.wakeup.notify_one();
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        if self.shared.is_elapsed(key, Instant::now()) {
            let mut schedule = self.shared.schedule.lock();
            // Re-check under the lock, the key may have been cached again meanwhile
            if self.shared.is_elapsed(key, Instant::now()) {
                schedule.cancel(&self.shared.deadlines, key);
                self.shared.inner.expire(key);
                return None;
            }
        }
        self.shared.inner.get(key)
    }

    fn expire(&self, key: &K) {
        let mut schedule = self.shared.schedule.lock();
        schedule.cancel(&self.shared.deadlines, key);
        self.shared.inner.expire(key);
    }

    fn expire_all(&self) {
        let mut schedule = self.shared.schedule.lock();
        schedule.clear(&self.shared.deadlines);
        self.shared.inner.expire_all();
    }

    fn len(&self) -> usize {
        self.shared.inner.len()
    }
}

impl<K, V> Drop for ExpiringCacheStrategy<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.shared.schedule.lock().shutdown = true;
        self.shared.wakeup.notify_all();
        if let Some(sweeper) = self.sweeper.take() {
            if sweeper.join().is_err() {
                log::warn!("Cache expiry thread terminated abnormally");
            }
        }
    }
}
