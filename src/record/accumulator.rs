//! Append-only collection of row records for one run.

use std::slice::Iter;

use super::Record;

/// Ordered, append-only sequence of records.
///
/// There is no removal or reordering; records come out in the order they
/// were pushed.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    records: Vec<Record>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Accumulator {
    type Item = &'a Record;
    type IntoIter = Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
