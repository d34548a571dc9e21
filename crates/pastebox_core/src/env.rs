//! Process-global environment mutation helpers.
//!
//! Configuration is read from the process environment, so tests that exercise
//! it mutate shared global state. [`ScopedEnv`] serializes those tests and
//! restores every variable it touched when dropped.

use std::sync::{Mutex, MutexGuard, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: every mutation goes through a ScopedEnv holding the env lock.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Exclusive, self-restoring view of the process environment.
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Acquire the process-wide environment lock.
    ///
    /// A poisoned lock is recovered; the previous holder already restored
    /// its variables while unwinding.
    pub fn lock() -> Self {
        let guard = env_lock()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self {
            saved: Vec::new(),
            _lock: guard,
        }
    }

    /// Set `key=value` for the lifetime of this scope.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.remember(key);
        write_var(key, Some(value));
        self
    }

    /// Remove `key` for the lifetime of this scope.
    pub fn unset(mut self, key: &str) -> Self {
        self.remember(key);
        write_var(key, None);
        self
    }

    fn remember(&mut self, key: &str) {
        if self.saved.iter().all(|(saved, _)| saved != key) {
            self.saved.push((key.to_string(), std::env::var(key).ok()));
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            write_var(&key, previous.as_deref());
        }
    }
}
