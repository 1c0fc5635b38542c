use crate::digits::Width;
use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximal number of independently locked cache shards (power of 2).
const NUM_SHARDS: usize = 16;

/// Cache key: the successor of a value only depends on its digit multiset, so the canonical
/// signature (together with the width, since `0123` and `123` share a signature) is enough.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey {
    pub width: Width,
    pub signature: u64,
}

/// Counters describing how a [`SuccessorCache`] has been used so far.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// Memoization of the Kaprekar map shared by all users of a [`crate::transform::Transformer`].
///
/// Implementations must tolerate concurrent readers and concurrent first writes. Since a key
/// always maps to the same successor, two workers racing on the same key both compute the
/// same answer and it does not matter which insert wins.
pub trait SuccessorCache: Send + Sync {
    /// Look up a previously stored successor.
    fn get(&self, key: CacheKey) -> Option<u64>;

    /// Store a successor. Inserting an already present key is a no-op.
    fn insert(&self, key: CacheKey, successor: u64);

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// A cache that never stores anything. This is the right choice for very large widths where
/// signatures rarely repeat.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCache;

impl SuccessorCache for NoCache {
    fn get(&self, _key: CacheKey) -> Option<u64> {
        None
    }

    fn insert(&self, _key: CacheKey, _successor: u64) {}
}

/// A capacity-bounded cache split into shards guarded by `parking_lot::Mutex`.
///
/// Each shard evicts its oldest entries first once it reaches its share of the total
/// capacity. Small caches use fewer shards, so every shard can hold at least one entry.
/// A capacity of zero produces a cache that never stores anything.
pub struct ShardedCache {
    shards: Box<[Mutex<CacheShard>]>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

struct CacheShard {
    capacity: usize,
    entries: HashMap<CacheKey, u64>,
    insertion_order: VecDeque<CacheKey>,
}

impl ShardedCache {
    /// Create a cache holding at most `capacity` entries, split as evenly as possible
    /// between the shards.
    pub fn with_capacity(capacity: usize) -> ShardedCache {
        let shard_count = 1usize << capacity.clamp(1, NUM_SHARDS).ilog2();
        debug!(
            "Created successor cache with {} shards of {} entries in total.",
            shard_count, capacity
        );
        let shards: Vec<Mutex<CacheShard>> = (0..shard_count)
            .map(|index| {
                let extra = usize::from(index < capacity % shard_count);
                Mutex::new(CacheShard {
                    capacity: capacity / shard_count + extra,
                    entries: HashMap::new(),
                    insertion_order: VecDeque::new(),
                })
            })
            .collect();
        ShardedCache {
            shards: shards.into_boxed_slice(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// The maximal number of entries this cache can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of entries currently stored.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard_for(&self, key: CacheKey) -> usize {
        // Fibonacci hashing; canonical signatures are heavily skewed in their low digits.
        let mixed = (key.signature ^ (key.width.get() as u64).rotate_left(56))
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (mixed >> 60) as usize & (self.shards.len() - 1)
    }
}

impl SuccessorCache for ShardedCache {
    fn get(&self, key: CacheKey) -> Option<u64> {
        let found = self.shards[self.shard_for(key)]
            .lock()
            .entries
            .get(&key)
            .copied();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    fn insert(&self, key: CacheKey, successor: u64) {
        let mut shard = self.shards[self.shard_for(key)].lock();
        if shard.capacity == 0 || shard.entries.contains_key(&key) {
            return;
        }
        while shard.entries.len() >= shard.capacity {
            let Some(oldest) = shard.insertion_order.pop_front() else {
                break;
            };
            shard.entries.remove(&oldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!("Evicted signature {} from successor cache.", oldest.signature);
        }
        shard.entries.insert(key, successor);
        shard.insertion_order.push_back(key);
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
