use std::rc::Rc;

use crate::gff::GffError;
use crate::gff::heap::{AliasCache, HeapAllocator, SharedOffsets};

#[test]
fn reservations_are_contiguous_and_forward_only() {
	let mut heap = HeapAllocator::new(12);
	assert_eq!(heap.reserve(8).expect("first"), 12);
	assert_eq!(heap.reserve(0).expect("empty region"), 20);
	assert_eq!(heap.reserve(4).expect("second"), 20);
	assert_eq!(heap.next_offset(), 24);
}

#[test]
fn reservation_may_not_reach_sentinel() {
	let mut heap = HeapAllocator::new(0xFFFF_FFF0);
	heap.reserve(8).expect("still below sentinel");
	let err = heap.reserve(8).expect_err("would reach sentinel");
	assert!(matches!(err, GffError::HeapTooLarge { at: 0xFFFF_FFF8, need: 8 }));
}

#[test]
fn alias_cache_is_keyed_by_offset_and_type() {
	let mut cache = AliasCache::new();
	let value = Rc::new(41_u32);
	cache.insert(16, Rc::clone(&value));

	let hit = cache.get::<u32>(16).expect("same offset and type");
	assert!(Rc::ptr_eq(&hit, &value));
	assert!(cache.get::<u64>(16).is_none(), "other type must miss");
	assert!(cache.get::<u32>(20).is_none(), "other offset must miss");
	assert_eq!(cache.len(), 1);
}

#[test]
fn shared_offsets_track_allocation_identity() {
	let mut shared = SharedOffsets::new();
	let first = Rc::new(String::from("same"));
	let twin = Rc::new(String::from("same"));
	shared.insert(&first, 64);

	assert_eq!(shared.get(&Rc::clone(&first)), Some(64));
	assert_eq!(shared.get(&twin), None, "equal content is not identity");
}
