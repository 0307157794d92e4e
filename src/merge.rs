use std::collections::HashSet;

use crate::entry::{EntryId, HumanEntry, StorageEntry};

/// Gives the identity `merge` deduplicates on.
pub trait Identified {
	fn identity(&self) -> Option<EntryId>;
}

impl Identified for HumanEntry {
	#[inline]
	fn identity(&self) -> Option<EntryId>
	{
		self.id
	}
}

impl Identified for StorageEntry {
	#[inline]
	fn identity(&self) -> Option<EntryId>
	{
		self.id
	}
}

/// Concatenates `collections` keeping the first entry seen for each id.
///
/// Entries without an id are always kept; only the store hands out ids, so two
/// of them are never the same entry.
pub fn merge<T, I>(collections: I) -> Vec<T>
	where T: Identified, I: IntoIterator<Item = Vec<T>>
{
	let mut seen = HashSet::new();
	let mut merged = vec![];
	for collection in collections {
		for entry in collection {
			match entry.identity() {
				Some(id) if !seen.insert(id) => {}
				_ => merged.push(entry),
			}
		}
	}
	merged
}

/// Drops entries structurally equal to an earlier one, ids included.
///
/// Unlike `merge` this also collapses repeated id-less entries.
pub fn dedup_exact<T: PartialEq>(entries: Vec<T>) -> Vec<T>
{
	let mut kept: Vec<T> = Vec::with_capacity(entries.len());
	for entry in entries {
		if !kept.contains(&entry) {
			kept.push(entry);
		}
	}
	kept
}
