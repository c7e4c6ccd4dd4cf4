//! Structural-hash table: ordered fanin pair -> node id.
//!
//! Open chaining over a power-of-two bucket array, in the same shape as the
//! node table of a decision-diagram manager. Entries live in a flat vector and
//! chain through indices; removed entries go onto an intrusive free list so
//! the table can shrink and grow with the network during a rewriting pass.

use crate::edge::{Edge, NodeId};
use crate::utils::MyHash;

#[derive(Debug, Copy, Clone)]
struct Entry {
    key: (Edge, Edge),
    node: NodeId,
    next: usize,
}

pub struct Strash {
    /// Entry 0 is a sentry and never used.
    entries: Vec<Entry>,
    buckets: Vec<usize>,
    bitmask: u64,
    /// Head of the free-entry list (0 = empty).
    free: usize,
    len: usize,
}

impl Strash {
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");

        let size = 1 << bits;
        let sentry = Entry {
            key: (Edge::one(), Edge::one()),
            node: 0,
            next: 0,
        };
        Self {
            entries: vec![sentry],
            buckets: vec![0; size],
            bitmask: (size - 1) as u64,
            free: 0,
            len: 0,
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_index(&self, key: &(Edge, Edge)) -> usize {
        (key.hash() & self.bitmask) as usize
    }

    /// Look up the node constructed from the given fanin pair, if any.
    pub fn lookup(&self, key: (Edge, Edge)) -> Option<NodeId> {
        let mut index = self.buckets[self.bucket_index(&key)];
        while index != 0 {
            let entry = &self.entries[index];
            if entry.key == key {
                return Some(entry.node);
            }
            index = entry.next;
        }
        None
    }

    /// Register a node under its fanin pair. The key must not be present.
    pub fn insert(&mut self, key: (Edge, Edge), node: NodeId) {
        debug_assert!(self.lookup(key).is_none(), "Duplicate strash key {:?}", key);

        let bucket_index = self.bucket_index(&key);
        let head = self.buckets[bucket_index];
        let entry = Entry {
            key,
            node,
            next: head,
        };

        let index = if self.free != 0 {
            let index = self.free;
            self.free = self.entries[index].next;
            self.entries[index] = entry;
            index
        } else {
            self.entries.push(entry);
            self.entries.len() - 1
        };

        self.buckets[bucket_index] = index;
        self.len += 1;
    }

    /// Unregister a key, provided it still maps to `node`. Returns whether an
    /// entry was removed.
    ///
    /// Dead nodes must leave the table immediately, so that a later
    /// construction of the same fanin pair can never resurrect them. The id
    /// check protects the case where the key has since been claimed by a
    /// different node: a merged-away reader shares its fanin pair with the
    /// surviving node, and removing by key alone would delete the survivor's
    /// entry.
    pub fn remove(&mut self, key: (Edge, Edge), node: NodeId) -> bool {
        let bucket_index = self.bucket_index(&key);
        let mut prev = 0usize;
        let mut index = self.buckets[bucket_index];

        while index != 0 {
            let entry = self.entries[index];
            if entry.key == key {
                if entry.node != node {
                    return false;
                }
                // Unlink from the chain.
                if prev == 0 {
                    self.buckets[bucket_index] = entry.next;
                } else {
                    self.entries[prev].next = entry.next;
                }
                // Push onto the free list.
                self.entries[index].next = self.free;
                self.free = index;
                self.len -= 1;
                return true;
            }
            prev = index;
            index = entry.next;
        }
        false
    }

    /// Drop every key. Bucket capacity is retained.
    pub fn clear(&mut self) {
        self.entries.truncate(1);
        self.buckets.fill(0);
        self.free = 0;
        self.len = 0;
    }
}
