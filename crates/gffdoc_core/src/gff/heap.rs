use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::gff::schema::SENTINEL;
use crate::gff::{GffError, Result};

/// Forward-only bump allocator over the data section.
///
/// Offsets are relative to the start of the data section. The first region handed out starts
/// right after the root structure's inline bytes; every later region starts where the previous
/// one ended. Nothing is freed or reused within one encode.
#[derive(Debug, Clone)]
pub struct HeapAllocator {
	next: u32,
}

impl HeapAllocator {
	/// Allocator whose first region starts at `start`.
	pub fn new(start: u32) -> Self {
		Self { next: start }
	}

	/// Offset the next reservation will receive.
	pub fn next_offset(&self) -> u32 {
		self.next
	}

	/// Reserve `len` bytes and return the region's start offset.
	///
	/// A region may not reach the absent sentinel, so every returned offset stays distinct from it.
	pub fn reserve(&mut self, len: u64) -> Result<u32> {
		let at = self.next;
		let end = u64::from(at) + len;
		if end >= u64::from(SENTINEL) {
			return Err(GffError::HeapTooLarge { at, need: len });
		}
		self.next = end as u32;
		Ok(at)
	}
}

/// Decode-time identity map from heap offset to the value materialised there.
///
/// Keys include the requested Rust type so the dynamic and typed engines (or two native types
/// reading the same bytes) never observe each other's entries.
#[derive(Default)]
pub struct AliasCache {
	entries: HashMap<(u32, TypeId), Rc<dyn Any>>,
}

impl AliasCache {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Previously decoded value at `offset`, if any.
	pub fn get<T: 'static>(&self, offset: u32) -> Option<Rc<T>> {
		let entry = self.entries.get(&(offset, TypeId::of::<T>()))?;
		Rc::clone(entry).downcast::<T>().ok()
	}

	/// Record the value decoded at `offset`.
	pub fn insert<T: 'static>(&mut self, offset: u32, value: Rc<T>) {
		self.entries.insert((offset, TypeId::of::<T>()), value);
	}

	/// Number of cached entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing has been cached.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Encode-time map from a shared allocation to the heap offset it was written at.
///
/// An `Rc` seen a second time is not written again; its slot receives the first offset.
#[derive(Default)]
pub struct SharedOffsets {
	entries: HashMap<(usize, TypeId), u32>,
	// Keeps every keyed allocation alive so an address cannot be reused by a new allocation.
	keep: Vec<Rc<dyn Any>>,
}

impl SharedOffsets {
	/// Empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Offset already assigned to `value`.
	pub fn get<T: 'static>(&self, value: &Rc<T>) -> Option<u32> {
		self.entries.get(&Self::key(value)).copied()
	}

	/// Assign `offset` to `value`.
	pub fn insert<T: 'static>(&mut self, value: &Rc<T>, offset: u32) {
		self.entries.insert(Self::key(value), offset);
		self.keep.push(Rc::clone(value) as Rc<dyn Any>);
	}

	fn key<T: 'static>(value: &Rc<T>) -> (usize, TypeId) {
		(Rc::as_ptr(value) as usize, TypeId::of::<T>())
	}
}

#[cfg(test)]
mod tests;
