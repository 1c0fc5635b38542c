use crate::digits::{Width, from_digits, to_digits};
use crate::error::KaprekarError;
use crate::test_utils::{init_logger, naive_canonical, naive_next, w};
use crate::transform::{
    CacheKey, NodeKind, ShardedCache, SuccessorCache, Transformer, next_value,
};
use std::sync::Arc;

/// All distinct digit permutations of `value` at `width`.
fn permutations(value: u64, width: Width) -> Vec<u64> {
    fn permute(digits: &mut [u8], k: usize, out: &mut Vec<u64>) {
        if k == digits.len() {
            out.push(from_digits(digits).unwrap());
            return;
        }
        for i in k..digits.len() {
            digits.swap(k, i);
            permute(digits, k + 1, out);
            digits.swap(k, i);
        }
    }
    let mut digits = to_digits(value, width).unwrap();
    let mut out = Vec::new();
    permute(&mut digits, 0, &mut out);
    out.sort();
    out.dedup();
    out
}

#[test]
fn kaprekar_constant_for_four_digits() {
    let width = w(4);
    assert_eq!(next_value(3524, width).unwrap(), 3087);
    assert_eq!(next_value(3087, width).unwrap(), 8352);
    assert_eq!(next_value(8352, width).unwrap(), 6174);
    assert_eq!(next_value(6174, width).unwrap(), 6174);
}

#[test]
fn three_digit_values_reach_495() {
    let width = w(3);
    assert_eq!(next_value(852, width).unwrap(), 594);
    assert_eq!(next_value(594, width).unwrap(), 495);
    assert!(Transformer::new(width).is_fixed_point(495).unwrap());
}

#[test]
fn repdigits_map_to_zero_which_is_fixed() {
    let transformer = Transformer::new(w(4));
    assert_eq!(transformer.next_value(7777).unwrap(), 0);
    assert!(transformer.is_fixed_point(0).unwrap());
    // 0999 is not a repdigit once padded.
    assert_eq!(transformer.next_value(999).unwrap(), 9990 - 999);
}

#[test]
fn matches_naive_reference_and_stays_in_range() {
    for width in 1..=4 {
        let transformer = Transformer::new(w(width));
        for value in 0..w(width).state_space() {
            let next = transformer.next_value(value).unwrap();
            assert_eq!(next, naive_next(value, width), "{} at width {}", value, width);
            assert!(next < w(width).state_space());
        }
    }
}

#[test]
fn successor_only_depends_on_digit_multiset() {
    let width = w(5);
    let transformer = Transformer::new(width);
    for value in [12345u64, 90210, 100, 55123, 98765, 1] {
        let expected = transformer.next_value(value).unwrap();
        for permuted in permutations(value, width) {
            assert_eq!(transformer.next_value(permuted).unwrap(), expected);
        }
    }
}

#[test]
fn signature_step_canonicalizes_the_successor() {
    let transformer = Transformer::new(w(4));
    // 2345 -> 5432 - 2345 = 3087 -> signature 0378.
    assert_eq!(transformer.next_signature(2345).unwrap(), 378);
    assert_eq!(transformer.next_signature(1467).unwrap(), 1467);
    for value in 0..10_000 {
        let expected = naive_canonical(naive_next(value, 4), 4);
        assert_eq!(transformer.next_signature(value).unwrap(), expected);
        assert_eq!(transformer.step(value, NodeKind::Signature), expected);
    }
}

#[test]
fn out_of_range_values_are_rejected() {
    let transformer = Transformer::new(w(3));
    assert_eq!(
        transformer.next_value(1000),
        Err(KaprekarError::InvalidValue {
            value: 1000,
            width: 3
        })
    );
    assert!(transformer.next_signature(5000).is_err());
    assert!(next_value(10, w(1)).is_err());
}

#[test]
fn cached_transformer_agrees_with_uncached() {
    init_logger();
    let width = w(4);
    let plain = Transformer::new(width);
    let cached = Transformer::bounded(width, 16_384);
    for value in 0..10_000 {
        assert_eq!(
            cached.next_value(value).unwrap(),
            plain.next_value(value).unwrap()
        );
    }
    let stats = cached.cache_stats();
    // 10^4 lookups over 715 classes: every class misses once.
    assert_eq!(stats.misses, 715);
    assert_eq!(stats.hits, 10_000 - 715);
    assert_eq!(stats.entries, 715);
    assert_eq!(stats.evictions, 0);
}

#[test]
fn bounded_cache_evicts_oldest_entries() {
    let cache = ShardedCache::with_capacity(16);
    assert_eq!(cache.capacity(), 16);
    let width = w(6);
    for signature in 0..1000u64 {
        cache.insert(CacheKey { width, signature }, signature);
    }
    let stats = cache.stats();
    assert!(stats.entries <= 16);
    assert_eq!(stats.evictions as usize, 1000 - stats.entries);
}

#[test]
fn small_caches_respect_their_capacity() {
    let width = w(6);
    for capacity in [1, 3, 17, 40] {
        let cache = ShardedCache::with_capacity(capacity);
        assert_eq!(cache.capacity(), capacity);
        for signature in 0..1000u64 {
            cache.insert(CacheKey { width, signature }, signature);
        }
        assert!(cache.len() <= capacity);
        assert!(!cache.is_empty());
    }
    let single = ShardedCache::with_capacity(1);
    single.insert(CacheKey { width, signature: 7 }, 7);
    single.insert(CacheKey { width, signature: 8 }, 8);
    assert_eq!(single.len(), 1);
    assert_eq!(single.get(CacheKey { width, signature: 8 }), Some(8));
}

#[test]
fn cache_insert_is_write_once() {
    let cache = ShardedCache::with_capacity(64);
    let key = CacheKey {
        width: w(3),
        signature: 459,
    };
    cache.insert(key, 495);
    cache.insert(key, 1);
    assert_eq!(cache.get(key), Some(495));
    assert_eq!(cache.len(), 1);
}

#[test]
fn zero_capacity_cache_stores_nothing() {
    let transformer = Transformer::with_cache(w(3), Arc::new(ShardedCache::with_capacity(0)));
    assert_eq!(transformer.next_value(852).unwrap(), 594);
    assert_eq!(transformer.cache_stats().entries, 0);
}

#[test]
fn shared_cache_is_safe_across_threads() {
    let transformer = Transformer::bounded(w(5), 4096);
    std::thread::scope(|scope| {
        for offset in 0..4u64 {
            let transformer = transformer.clone();
            scope.spawn(move || {
                for value in (offset..100_000).step_by(4) {
                    assert_eq!(
                        transformer.next_value(value).unwrap(),
                        naive_next(value, 5)
                    );
                }
            });
        }
    });
    assert!(transformer.cache_stats().entries <= 4096);
}
