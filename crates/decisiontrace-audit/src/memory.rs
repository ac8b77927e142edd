//! In-memory implementation of `DecisionStore`.
//!
//! `InMemoryStore` keeps serialized lines in a `Vec` behind a `Mutex`. It
//! behaves exactly like the file store from the chain's point of view, which
//! makes it the store of choice for tests and for embedding the log in a
//! longer-running process that persists it elsewhere.

use std::sync::{Mutex, PoisonError};

use decisiontrace_contracts::error::{TraceError, TraceResult};
use decisiontrace_core::traits::DecisionStore;

/// An append-only line store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Every line appended so far, without newlines.
    pub(crate) lines: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing serialized lines, e.g. a log loaded from
    /// elsewhere.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of lines held.
    ///
    /// A poisoned lock still holds every line pushed before the panic, so the
    /// count is read through it.
    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DecisionStore for InMemoryStore {
    fn read_lines(&self) -> TraceResult<Vec<String>> {
        let lines = self.lines.lock().map_err(|e| TraceError::StoreRead {
            reason: format!("store lock poisoned: {}", e),
        })?;
        Ok(lines.clone())
    }

    fn append_exclusive(
        &self,
        build: &mut dyn FnMut(&[String]) -> TraceResult<String>,
    ) -> TraceResult<()> {
        let mut lines = self.lines.lock().map_err(|e| TraceError::StoreWrite {
            reason: format!("store lock poisoned: {}", e),
        })?;
        let line = build(&lines)?;
        lines.push(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::InMemoryStore;

    #[test]
    fn len_survives_poisoned_lock() {
        let store = Arc::new(InMemoryStore::from_lines(["a", "b", "c"]));

        let poisoner = Arc::clone(&store);
        let joined = thread::spawn(move || {
            let _guard = poisoner.lines.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert!(joined.is_err());
        assert!(store.lines.is_poisoned());
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
    }
}
