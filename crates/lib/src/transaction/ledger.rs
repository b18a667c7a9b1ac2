//! Record of applied processors.

/// Pool indices of the processors whose `apply()` succeeded, in apply order.
#[derive(Debug, Default)]
pub struct UndoLedger {
  entries: Vec<usize>,
}

impl UndoLedger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, index: usize) {
    self.entries.push(index);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
    self.entries.iter().copied()
  }

  /// Drain every entry, most recent first.
  ///
  /// The ledger is empty afterwards, even if the iterator is dropped early.
  pub fn pop_all(&mut self) -> impl Iterator<Item = usize> + '_ {
    self.entries.drain(..).rev()
  }
}
