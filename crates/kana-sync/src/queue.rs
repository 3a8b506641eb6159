//! [`UploadQueue`]: the memory-only FIFO of records awaiting upload.
//!
//! The queue does not deduplicate: a record that fails is pushed back as a
//! fresh entry, and enqueuing the same record twice yields two entries.

use std::collections::VecDeque;

use kana_core::record::PracticeRecord;

/// A queued record together with its failed submission count.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
  pub record:   PracticeRecord,
  pub attempts: u32,
}

impl PendingUpload {
  pub fn new(record: PracticeRecord) -> Self { Self { record, attempts: 0 } }
}

#[derive(Debug, Default)]
pub struct UploadQueue {
  items: VecDeque<PendingUpload>,
}

impl UploadQueue {
  pub fn new() -> Self { Self::default() }

  /// Append a never-attempted record to the back.
  pub fn enqueue(&mut self, record: PracticeRecord) {
    self.items.push_back(PendingUpload::new(record));
  }

  /// Return a previously dequeued entry to the back, keeping its attempt
  /// count.
  pub fn requeue(&mut self, pending: PendingUpload) { self.items.push_back(pending); }

  /// Remove and return up to `n` entries from the front, oldest first.
  pub fn dequeue_batch(&mut self, n: usize) -> Vec<PendingUpload> {
    let n = n.min(self.items.len());
    self.items.drain(..n).collect()
  }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use kana_core::record::NewPracticeRecord;

  use super::*;

  fn record(character: &str) -> PracticeRecord {
    PracticeRecord::create(NewPracticeRecord::new("u1", character, true, 1.0), Utc::now())
  }

  fn characters(batch: &[PendingUpload]) -> Vec<&str> {
    batch.iter().map(|p| p.record.character.as_str()).collect()
  }

  #[test]
  fn dequeue_batch_is_fifo_and_bounded() {
    let mut q = UploadQueue::new();
    for c in ["あ", "い", "う", "え", "お", "か", "き"] {
      q.enqueue(record(c));
    }

    let first = q.dequeue_batch(5);
    assert_eq!(characters(&first), ["あ", "い", "う", "え", "お"]);
    assert_eq!(q.len(), 2);

    let second = q.dequeue_batch(5);
    assert_eq!(characters(&second), ["か", "き"]);
    assert!(q.is_empty());
    assert!(q.dequeue_batch(5).is_empty());
  }

  #[test]
  fn requeue_goes_to_back_and_keeps_attempts() {
    let mut q = UploadQueue::new();
    q.enqueue(record("あ"));
    q.enqueue(record("い"));

    let mut failed = q.dequeue_batch(1).remove(0);
    failed.attempts += 1;
    q.requeue(failed);

    let rest = q.dequeue_batch(5);
    assert_eq!(characters(&rest), ["い", "あ"]);
    assert_eq!(rest[1].attempts, 1);
  }

  #[test]
  fn no_deduplication_by_id() {
    let mut q = UploadQueue::new();
    let r = record("あ");
    q.enqueue(r.clone());
    q.enqueue(r);
    assert_eq!(q.len(), 2);
  }
}
