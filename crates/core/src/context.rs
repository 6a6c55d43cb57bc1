//! Error Context and Checkpoints
//!
//! An `ErrorContext` holds the current error payload and a LIFO stack of
//! checkpoints (resumption points). Generated code establishes a checkpoint
//! before a region that must catch failures and releases it on the way out.
//! A failure anywhere inside the region travels back to the innermost armed
//! checkpoint via ordinary `Result` propagation; destructors run on the way,
//! so nothing allocated inside the region leaks.
//!
//! Each logical task owns its own context. There is no global
//! instance: contexts are passed explicitly (by `&mut` in Rust, by pointer
//! across the C ABI).
//!
//! # Checkpoint lifecycle
//!
//! ```text
//!   establish ──► Armed ──► release (no pending failure) ──► Completed
//!                   │
//!                   └─────► failure in extent ─────────────► Caught(payload)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut ctx = ErrorContext::new();
//! let result = ctx.guard(Position::new(3, 1), |ctx| {
//!     let first = array.first(Position::new(4, 5))?;
//!     Ok(*first)
//! });
//! ```

use crate::error::{ErrorPayload, RuntimeError};
use crate::position::Position;
use std::fmt;

/// Identifier handed out by `establish` and checked by `release`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckpointId(u64);

impl CheckpointId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(raw: u64) -> Self {
        CheckpointId(raw)
    }
}

#[derive(Debug, Clone)]
struct Checkpoint {
    id: CheckpointId,
    position: Position,
}

/// How an armed checkpoint was consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointOutcome {
    /// The guarded region exited normally
    Completed,
    /// A failure in the region was transferred here
    Caught(ErrorPayload),
}

/// Misuse of the checkpoint stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    /// `release` was called with no checkpoint armed
    NotArmed,
    /// `release` was called for a checkpoint that is not on top of the stack
    OutOfOrder {
        expected: CheckpointId,
        got: CheckpointId,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::NotArmed => write!(f, "release without an armed checkpoint"),
            CheckpointError::OutOfOrder { expected, got } => write!(
                f,
                "checkpoint {} released while {} is innermost",
                got.0, expected.0
            ),
        }
    }
}

impl std::error::Error for CheckpointError {}

/// Per-task error state: current payload plus the checkpoint stack
#[derive(Debug, Default)]
pub struct ErrorContext {
    last: Option<ErrorPayload>,
    pending: bool,
    generation: u64,
    checkpoints: Vec<Checkpoint>,
    next_id: u64,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed checkpoints
    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Whether some checkpoint is armed to receive a failure
    pub fn is_armed(&self) -> bool {
        !self.checkpoints.is_empty()
    }

    /// Push a new checkpoint; it becomes the active catch target
    pub fn establish(&mut self, position: Position) -> CheckpointId {
        self.next_id += 1;
        let id = CheckpointId(self.next_id);
        self.checkpoints.push(Checkpoint { id, position });
        tracing::trace!(checkpoint = id.0, depth = self.depth(), %position, "checkpoint armed");
        id
    }

    /// Pop the innermost checkpoint
    ///
    /// If a failure was signalled since it was armed (and not yet consumed by
    /// an inner checkpoint) the outcome is `Caught` and the pending flag is
    /// cleared. The payload itself stays readable through `last_error`.
    pub fn release(&mut self, id: CheckpointId) -> Result<CheckpointOutcome, CheckpointError> {
        let top = self.checkpoints.last().ok_or(CheckpointError::NotArmed)?;
        if top.id != id {
            return Err(CheckpointError::OutOfOrder {
                expected: top.id,
                got: id,
            });
        }
        let checkpoint = self.checkpoints.pop().ok_or(CheckpointError::NotArmed)?;

        if self.pending {
            self.pending = false;
            let payload = self.last.clone().unwrap_or_else(|| {
                ErrorPayload::new(checkpoint.position, "unknown error")
            });
            tracing::debug!(
                checkpoint = id.0,
                established_at = %checkpoint.position,
                error = %payload,
                "checkpoint caught failure"
            );
            Ok(CheckpointOutcome::Caught(payload))
        } else {
            tracing::trace!(checkpoint = id.0, "checkpoint completed");
            Ok(CheckpointOutcome::Completed)
        }
    }

    /// Run `body` under a fresh checkpoint
    ///
    /// Returns the body's value, or the payload of the failure that aborted
    /// it. Checkpoints the body armed and never released are discarded along
    /// with it (they were inside the failed extent).
    pub fn guard<T, F>(&mut self, position: Position, body: F) -> Result<T, ErrorPayload>
    where
        F: FnOnce(&mut ErrorContext) -> Result<T, RuntimeError>,
    {
        let id = self.establish(position);
        let result = body(self);
        self.discard_above(id);

        if let Err(err) = &result {
            self.fail_with(err);
        }

        match self.release(id) {
            Ok(CheckpointOutcome::Completed) => result.map_err(RuntimeError::into_payload),
            Ok(CheckpointOutcome::Caught(payload)) => Err(payload),
            Err(misuse) => Err(ErrorPayload::new(position, misuse.to_string())),
        }
    }

    /// Signal a failure: write the payload and hand back the error to
    /// propagate with `?` towards the innermost checkpoint
    pub fn signal<T>(
        &mut self,
        position: Position,
        message: impl Into<String>,
    ) -> Result<T, RuntimeError> {
        let payload = ErrorPayload::new(position, message);
        self.record(payload.clone());
        Err(RuntimeError::Failure(payload))
    }

    /// Record an error raised elsewhere as the current payload
    pub fn fail_with(&mut self, err: &RuntimeError) {
        self.record(err.payload());
    }

    fn record(&mut self, payload: ErrorPayload) {
        self.last = Some(payload);
        self.pending = true;
        self.generation += 1;
    }

    /// Number of failures recorded so far
    ///
    /// A foreign callback failed if the generation moved during the call and
    /// a failure is still pending afterwards; older failures do not count.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a signalled failure has not yet reached a checkpoint
    pub fn has_error(&self) -> bool {
        self.pending
    }

    /// The most recent payload, even if already caught
    pub fn last_error(&self) -> Option<&ErrorPayload> {
        self.last.as_ref()
    }

    /// Take (and clear) the most recent payload
    pub fn take_error(&mut self) -> Option<ErrorPayload> {
        self.pending = false;
        self.last.take()
    }

    pub fn clear_error(&mut self) {
        self.pending = false;
        self.last = None;
    }

    fn discard_above(&mut self, id: CheckpointId) {
        while let Some(top) = self.checkpoints.last() {
            if top.id == id {
                break;
            }
            tracing::trace!(checkpoint = top.id.0, "checkpoint discarded by transfer");
            self.checkpoints.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32) -> Position {
        Position::new(line, 1)
    }

    #[test]
    fn test_establish_and_release_completed() {
        let mut ctx = ErrorContext::new();
        let id = ctx.establish(pos(1));
        assert!(ctx.is_armed());
        assert_eq!(ctx.release(id), Ok(CheckpointOutcome::Completed));
        assert!(!ctx.is_armed());
    }

    #[test]
    fn test_release_catches_pending_signal() {
        let mut ctx = ErrorContext::new();
        let id = ctx.establish(pos(1));
        let _: Result<(), _> = ctx.signal(pos(2), "boom");
        assert!(ctx.has_error());

        let outcome = ctx.release(id).unwrap();
        assert_eq!(
            outcome,
            CheckpointOutcome::Caught(ErrorPayload::new(pos(2), "boom"))
        );
        assert!(!ctx.has_error());
        assert_eq!(ctx.last_error().map(|p| p.message.as_str()), Some("boom"));
    }

    #[test]
    fn test_release_out_of_order() {
        let mut ctx = ErrorContext::new();
        let outer = ctx.establish(pos(1));
        let inner = ctx.establish(pos(2));
        assert_eq!(
            ctx.release(outer),
            Err(CheckpointError::OutOfOrder {
                expected: inner,
                got: outer
            })
        );
        assert_eq!(ctx.depth(), 2);
    }

    #[test]
    fn test_release_not_armed() {
        let mut ctx = ErrorContext::new();
        assert_eq!(
            ctx.release(CheckpointId::from_u64(9)),
            Err(CheckpointError::NotArmed)
        );
    }

    #[test]
    fn test_guard_ok() {
        let mut ctx = ErrorContext::new();
        let value = ctx.guard(pos(1), |_| Ok(41 + 1));
        assert_eq!(value, Ok(42));
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.last_error().is_none());
    }

    #[test]
    fn test_guard_catches_error() {
        let mut ctx = ErrorContext::new();
        let result: Result<(), _> = ctx.guard(pos(1), |ctx| {
            ctx.signal::<()>(pos(5), "inner failure")?;
            unreachable!("signal must abort the region");
        });
        assert_eq!(result, Err(ErrorPayload::new(pos(5), "inner failure")));
        assert_eq!(ctx.depth(), 0);
        assert!(!ctx.has_error());
    }

    #[test]
    fn test_nested_inner_catches_only_its_extent() {
        let mut ctx = ErrorContext::new();
        let mut inner_caught = None;
        let outer = ctx.guard(pos(1), |ctx| {
            inner_caught = ctx
                .guard(pos(2), |ctx| ctx.signal::<()>(pos(3), "inner"))
                .err();
            assert_eq!(ctx.depth(), 1);
            // After the inner region exited, failures go to the outer one
            ctx.signal::<i32>(pos(4), "outer")
        });
        assert_eq!(inner_caught, Some(ErrorPayload::new(pos(3), "inner")));
        assert_eq!(outer, Err(ErrorPayload::new(pos(4), "outer")));
    }

    #[test]
    fn test_guard_discards_unreleased_inner_checkpoints() {
        let mut ctx = ErrorContext::new();
        let result: Result<(), _> = ctx.guard(pos(1), |ctx| {
            ctx.establish(pos(2));
            ctx.establish(pos(3));
            Err(RuntimeError::failure(pos(4), "escaped"))
        });
        assert!(result.is_err());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_latest_signal_wins() {
        let mut ctx = ErrorContext::new();
        let _: Result<(), _> = ctx.signal(pos(1), "first");
        let _: Result<(), _> = ctx.signal(pos(2), "second");
        assert_eq!(ctx.take_error(), Some(ErrorPayload::new(pos(2), "second")));
        assert!(ctx.take_error().is_none());
    }

    #[test]
    fn test_generation_counts_signals() {
        let mut ctx = ErrorContext::new();
        assert_eq!(ctx.generation(), 0);
        let _: Result<(), _> = ctx.signal(pos(1), "a");
        let _: Result<(), _> = ctx.signal(pos(1), "b");
        ctx.clear_error();
        assert_eq!(ctx.generation(), 2);
    }

    #[test]
    fn test_fail_with_runtime_error() {
        let mut ctx = ErrorContext::new();
        ctx.fail_with(&RuntimeError::OutOfBounds {
            position: pos(8),
            index: 3,
        });
        assert!(ctx.has_error());
        assert_eq!(
            ctx.last_error().map(|p| p.message.clone()),
            Some("index 3 out of array bounds".to_string())
        );
        ctx.clear_error();
        assert!(!ctx.has_error());
        assert!(ctx.last_error().is_none());
    }
}
