use crate::entry::{CodeId, EntryId, StorageEntry, TagId};
use crate::error::Result;

/// Predicate reads and single-statement writes over storage-form entries.
///
/// Every entry handed back carries its id. Reads that match nothing return an
/// empty list or `None`, never an error.
pub trait EntryStore {
	fn find_by_id(&self, id: EntryId) -> Result<Option<StorageEntry>>;

	fn find_by_headword(&self, headword: &str) -> Result<Vec<StorageEntry>>;

	/// Headwords starting with `prefix`, compared byte for byte.
	fn find_by_headword_prefix(&self, prefix: &str) -> Result<Vec<StorageEntry>>;

	fn find_by_tag_id(&self, tag: TagId) -> Result<Vec<StorageEntry>>;

	fn find_by_word_class_id(&self, word_class: CodeId) -> Result<Vec<StorageEntry>>;

	/// Case-sensitive containment, no tokenizing.
	fn find_by_definition_contains(&self, text: &str) -> Result<Vec<StorageEntry>>;

	fn find_all(&self) -> Result<Vec<StorageEntry>>;

	/// Stores a new row and returns the id it was given. `entry.id` is ignored.
	fn insert(&self, entry: &StorageEntry) -> Result<EntryId>;

	/// Replaces the five mutable fields of row `id`; returns rows changed.
	fn update(&self, id: EntryId, entry: &StorageEntry) -> Result<u64>;

	/// Removes row `id` and its tag memberships; returns rows removed.
	fn delete(&self, id: EntryId) -> Result<u64>;

	fn find_tag_id(&self, name: &str) -> Result<Option<TagId>>;

	fn tag_name(&self, tag: TagId) -> Result<Option<String>>;

	/// Adds a tag unless present; returns its id either way.
	fn define_tag(&self, name: &str) -> Result<TagId>;

	/// Links an entry to a tag; returns 0 when the link already existed.
	/// An unknown entry is `Error::NotFound`.
	fn tag_entry(&self, id: EntryId, tag: TagId) -> Result<u64>;
}
