//! The storage seam for the decision log.
//!
//! The chain engine never touches a path directly. Every operation receives
//! an explicit `DecisionStore` handle, so the same appender, verifier, and
//! locator run against a file on disk or an in-memory buffer.

use decisiontrace_contracts::error::TraceResult;

/// An append-only sequence of text lines, one serialized record per line.
///
/// Implementations must treat the store as append-only: lines are never
/// modified or removed by the runtime.
pub trait DecisionStore: Send + Sync {
    /// Return every physical line in store order.
    ///
    /// A store that does not exist yet reads as empty. A trailing newline
    /// does not produce an extra empty line. Returns `StoreRead` only when
    /// the underlying medium cannot be read.
    fn read_lines(&self) -> TraceResult<Vec<String>>;

    /// Append one line while holding the store's exclusive writer lock.
    ///
    /// `build` receives the lines present at the moment the lock was taken
    /// and returns the line to append (without its newline). The lock spans
    /// the read, the call to `build`, and the write, so two appends can
    /// never observe the same tail. If `build` fails, nothing is written and
    /// its error is returned unchanged.
    fn append_exclusive(
        &self,
        build: &mut dyn FnMut(&[String]) -> TraceResult<String>,
    ) -> TraceResult<()>;
}
