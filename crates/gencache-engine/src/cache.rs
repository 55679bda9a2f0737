//! Memoized results keyed by category and input digest

use gencache_core::{Category, GenerationOutput};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Result cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: Category,
    /// Hex SHA-256 of the input text
    pub digest: String,
}

impl CacheKey {
    pub fn new(category: Category, input: &str) -> Self {
        let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
        Self { category, digest }
    }
}

struct Entry {
    /// Insertion sequence, larger is newer
    seq: u64,
    output: GenerationOutput,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    next_seq: u64,
}

/// Bounded result cache
///
/// Once more than `capacity` entries are held, everything but the `retain`
/// most recently inserted is dropped.
pub struct ResultCache {
    inner: Mutex<Inner>,
    capacity: usize,
    retain: usize,
}

impl ResultCache {
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity,
            retain: retain.min(capacity),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<GenerationOutput> {
        self.inner.lock().entries.get(key).map(|e| e.output.clone())
    }

    /// Store an output, trimming when over capacity
    ///
    /// Re-inserting an existing key replaces the output but keeps its age.
    pub fn insert(&self, key: CacheKey, output: GenerationOutput) {
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.output = output;
            return;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(key, Entry { seq, output });

        if inner.entries.len() > self.capacity {
            trim(&mut inner.entries, self.retain);
        }
    }

    /// Drop all but the `retain` newest entries
    pub fn trim(&self) {
        trim(&mut self.inner.lock().entries, self.retain);
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn trim(entries: &mut HashMap<CacheKey, Entry>, retain: usize) {
    if entries.len() <= retain {
        return;
    }
    if retain == 0 {
        entries.clear();
        return;
    }

    let mut seqs: Vec<u64> = entries.values().map(|e| e.seq).collect();
    seqs.sort_unstable_by(|a, b| b.cmp(a));
    let cutoff = seqs[retain - 1];

    entries.retain(|_, e| e.seq >= cutoff);
}
