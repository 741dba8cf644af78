//! Incremental reveal of assistant messages.
//!
//! Assistant replies arrive as one complete string, but the view shows them
//! the way a typing partner would produce them. A [`RevealTask`] steps through
//! a [`RevealPolicy`]'s chunk plan on a timer, growing the targeted message's
//! `visible_text` toward `full_text` and emitting each newly revealed slice on
//! a channel. At most one task should be live per chat session; starting a new
//! one cancels the previous one unconditionally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::observability::{REVEAL_CANCELLED, REVEAL_STEPS, REVEAL_TASKS};
use crate::types::Transcript;

/// Length threshold (in chars) below which text reveals one char at a time.
const CHAR_THRESHOLD: usize = 300;

/// Length threshold above which the larger chunk size applies.
const LARGE_THRESHOLD: usize = 1000;

/// Chunk size for long texts.
const CHUNK: usize = 15;

/// Chunk size for very long texts, to bound total animation time.
const LARGE_CHUNK: usize = 30;

/// Timing and chunking policy for the reveal animation.
///
/// Short texts reveal one char at a time for a smooth typing feel; longer
/// texts reveal in fixed chunks so the animation finishes in bounded time
/// without excessive update frequency. Both tiers flow through one
/// [`RevealPolicy::chunk_plan`] so the engine is a pure data-to-schedule
/// mapping plus a timer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPolicy {
    /// Lengths at or below this reveal one char per step.
    pub char_threshold: usize,

    /// Lengths above this use `large_chunk` instead of `chunk`.
    pub large_threshold: usize,

    /// Chars per step for long texts.
    pub chunk: usize,

    /// Chars per step for very long texts.
    pub large_chunk: usize,

    /// Delay between per-char steps.
    pub char_interval: Duration,

    /// Delay between chunked steps.
    pub chunk_interval: Duration,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            char_threshold: CHAR_THRESHOLD,
            large_threshold: LARGE_THRESHOLD,
            chunk: CHUNK,
            large_chunk: LARGE_CHUNK,
            char_interval: Duration::from_millis(15),
            chunk_interval: Duration::from_millis(20),
        }
    }
}

impl RevealPolicy {
    /// A policy with zero delays, for views that want the text at once.
    pub fn instant() -> Self {
        Self {
            char_interval: Duration::ZERO,
            chunk_interval: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Chars revealed per step for a text of `len` chars.
    pub fn step_size(&self, len: usize) -> usize {
        if len <= self.char_threshold {
            1
        } else if len > self.large_threshold {
            self.large_chunk
        } else {
            self.chunk
        }
    }

    /// Delay between steps for a text of `len` chars.
    pub fn interval(&self, len: usize) -> Duration {
        if len <= self.char_threshold {
            self.char_interval
        } else {
            self.chunk_interval
        }
    }

    /// The sequence of chunk sizes that reveals a text of `len` chars.
    ///
    /// Sizes are positive and sum to exactly `len`.
    pub fn chunk_plan(&self, len: usize) -> Vec<usize> {
        let step = self.step_size(len);
        let mut plan = Vec::with_capacity(len.div_ceil(step.max(1)));
        let mut remaining = len;
        while remaining > 0 {
            let size = step.min(remaining);
            plan.push(size);
            remaining -= size;
        }
        plan
    }
}

/// Handle over an in-flight reveal animation.
///
/// Dropping the handle does not stop the task; call [`RevealTask::cancel`].
/// A cancelled task applies no further mutation to the transcript.
pub struct RevealTask {
    cancelled: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RevealTask {
    /// Start revealing the message at `index` in the transcript.
    ///
    /// Returns the task handle and a channel yielding each newly revealed
    /// slice of text. The channel closes when the task completes or is
    /// cancelled.
    pub fn spawn(
        transcript: Arc<Mutex<Transcript>>,
        index: usize,
        policy: RevealPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        REVEAL_TASKS.click();
        let cancelled = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::unbounded_channel();

        let task_cancelled = Arc::clone(&cancelled);
        let task_done = Arc::clone(&done);
        let handle = tokio::spawn(async move {
            // A cancelled task must not look complete; input stays gated on
            // whatever replaces it.
            if run_reveal(transcript, index, policy, task_cancelled, &tx).await {
                task_done.store(true, Ordering::Release);
            }
        });

        (
            Self {
                cancelled,
                done,
                handle,
            },
            rx,
        )
    }

    /// Stop the animation. The pending timer step is dropped and no further
    /// transcript mutation occurs.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            REVEAL_CANCELLED.click();
        }
        self.handle.abort();
    }

    /// Returns true once every char of the target message is visible.
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Returns true if the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the task to finish (completion or cancellation).
    pub async fn wait(&mut self) {
        // Abort shows up as a JoinError; either way the task is over.
        let _ = (&mut self.handle).await;
    }
}

/// Returns true if the whole plan ran to completion.
async fn run_reveal(
    transcript: Arc<Mutex<Transcript>>,
    index: usize,
    policy: RevealPolicy,
    cancelled: Arc<AtomicBool>,
    tx: &mpsc::UnboundedSender<String>,
) -> bool {
    let full_text = {
        let Ok(guard) = transcript.lock() else {
            return false;
        };
        match guard.message(index) {
            Some(message) => message.full_text.clone(),
            None => return false,
        }
    };

    let len = full_text.chars().count();
    let interval = policy.interval(len);
    let mut cursor = 0usize;
    let mut byte_cursor = 0usize;

    for size in policy.chunk_plan(len) {
        tokio::time::sleep(interval).await;
        if cancelled.load(Ordering::Acquire) {
            return false;
        }

        cursor += size;
        let next_byte = char_boundary(&full_text, cursor);
        let delta = full_text[byte_cursor..next_byte].to_string();
        byte_cursor = next_byte;

        {
            let Ok(mut guard) = transcript.lock() else {
                return false;
            };
            let Some(message) = guard.message_mut(index) else {
                return false;
            };
            message.visible_text = full_text[..byte_cursor].to_string();
        }
        REVEAL_STEPS.click();
        if tx.send(delta).is_err() {
            return false;
        }
    }
    true
}

/// Byte offset of the `n`-th char boundary, clamped to the end of the string.
fn char_boundary(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
