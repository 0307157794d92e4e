use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use sled::{Config, Db, IVec, Tree};
use tracing::warn;

use crate::code_table::{CodeSpace, CodeTable};
use crate::entry::{CodeId, EntryId, StorageEntry, TagId};
use crate::error::{Error, Result};
use crate::store::EntryStore;

const ENTRIES_TREE: &str = "entries";
const TAG_ENTRIES_TREE: &str = "tag_entries";

/// Entry row as kept under its big-endian id key.
#[derive(Serialize, Deserialize)]
struct Record {
	headword: String,
	wordtype: CodeId,
	definition: String,
	hw_lang: CodeId,
	def_lang: CodeId,
}

/// A name <-> id table held in two trees.
struct Names {
	by_name: Tree,
	by_id: Tree,
}

/// Entry store and code table kept in a sled database.
///
/// Predicate reads other than by id scan the entries tree.
pub struct SledStore {
	db: Db,
	entries: Tree,
	tag_entries: Tree,
	word_classes: Names,
	languages: Names,
	tags: Names,
}

impl SledStore {
	pub fn open(path: impl AsRef<Path>) -> Result<Self>
	{
		let db = Config::new()
			.path(path)
			.open()
			.map_err(sled_error_map)?;
		Self::with_db(db)
	}

	/// A store removed from disk when dropped.
	pub fn temporary() -> Result<Self>
	{
		let db = Config::new()
			.temporary(true)
			.open()
			.map_err(sled_error_map)?;
		Self::with_db(db)
	}

	fn with_db(db: Db) -> Result<Self>
	{
		Ok(SledStore {
			entries: open_tree(&db, ENTRIES_TREE)?,
			tag_entries: open_tree(&db, TAG_ENTRIES_TREE)?,
			word_classes: Names::open(&db, "wordtypes")?,
			languages: Names::open(&db, "languages")?,
			tags: Names::open(&db, "tags")?,
			db,
		})
	}

	#[inline]
	fn names(&self, space: CodeSpace) -> &Names
	{
		match space {
			CodeSpace::WordClass => &self.word_classes,
			CodeSpace::Language => &self.languages,
		}
	}

	fn generate_id(&self) -> Result<i64>
	{
		let id = self.db.generate_id().map_err(sled_error_map)?;
		Ok(id as i64)
	}

	fn scan<F>(&self, mut keep: F) -> Result<Vec<StorageEntry>>
		where F: FnMut(&StorageEntry) -> bool
	{
		let mut found = vec![];
		for item in self.entries.iter() {
			let (key, value) = item.map_err(sled_error_map)?;
			let entry = decode_entry(&key, &value)?;
			if keep(&entry) {
				found.push(entry);
			}
		}
		Ok(found)
	}
}

impl Drop for SledStore {
	fn drop(&mut self)
	{
		if let Err(error) = self.db.flush() {
			warn!(error = %error, "failed to flush sled store");
		}
	}
}

impl Names {
	fn open(db: &Db, name: &str) -> Result<Self>
	{
		Ok(Names {
			by_name: open_tree(db, &format!("{name}_by_name"))?,
			by_id: open_tree(db, &format!("{name}_by_id"))?,
		})
	}

	fn id(&self, name: &str) -> Result<Option<i64>>
	{
		let id = self.by_name.get(name.as_bytes()).map_err(sled_error_map)?;
		Ok(id.map(|id| read_key(&id)))
	}

	fn name(&self, id: i64) -> Result<Option<String>>
	{
		let name = self.by_id.get(key(id)).map_err(sled_error_map)?;
		Ok(name.map(|name| String::from_utf8_lossy(&name).to_string()))
	}

	/// Claims `name` for `candidate` unless another id already holds it.
	fn define(&self, name: &str, candidate: i64) -> Result<i64>
	{
		let claimed = self.by_name
			.compare_and_swap(name.as_bytes(), None as Option<&[u8]>, Some(&key(candidate)[..]))
			.map_err(sled_error_map)?;
		match claimed {
			Ok(()) => {
				self.by_id.insert(key(candidate), name.as_bytes()).map_err(sled_error_map)?;
				Ok(candidate)
			}
			Err(conflict) => match conflict.current {
				Some(current) => Ok(read_key(&current)),
				None => Err(Error::Store(format!("lost definition of {name}"))),
			}
		}
	}
}

impl CodeTable for SledStore {
	fn resolve_id(&self, space: CodeSpace, name: &str) -> Result<Option<CodeId>>
	{
		Ok(self.names(space).id(name)?.map(CodeId))
	}

	fn resolve_name(&self, space: CodeSpace, id: CodeId) -> Result<Option<String>>
	{
		self.names(space).name(id.0)
	}

	fn define(&self, space: CodeSpace, name: &str) -> Result<CodeId>
	{
		let names = self.names(space);
		if let Some(id) = names.id(name)? {
			return Ok(CodeId(id));
		}
		let candidate = self.generate_id()?;
		names.define(name, candidate).map(CodeId)
	}
}

impl EntryStore for SledStore {
	fn find_by_id(&self, id: EntryId) -> Result<Option<StorageEntry>>
	{
		let key = key(id.0);
		match self.entries.get(key).map_err(sled_error_map)? {
			Some(value) => Ok(Some(decode_entry(&key, &value)?)),
			None => Ok(None),
		}
	}

	fn find_by_headword(&self, headword: &str) -> Result<Vec<StorageEntry>>
	{
		self.scan(|entry| entry.headword == headword)
	}

	fn find_by_headword_prefix(&self, prefix: &str) -> Result<Vec<StorageEntry>>
	{
		self.scan(|entry| entry.headword.starts_with(prefix))
	}

	fn find_by_tag_id(&self, tag: TagId) -> Result<Vec<StorageEntry>>
	{
		let mut found = vec![];
		for item in self.tag_entries.scan_prefix(key(tag.0)) {
			let (link, _) = item.map_err(sled_error_map)?;
			let id = EntryId(read_key(&link[8..]));
			// a link can outlive its entry between the two removals in delete
			if let Some(entry) = self.find_by_id(id)? {
				found.push(entry);
			}
		}
		Ok(found)
	}

	fn find_by_word_class_id(&self, word_class: CodeId) -> Result<Vec<StorageEntry>>
	{
		self.scan(|entry| entry.word_class == word_class)
	}

	fn find_by_definition_contains(&self, text: &str) -> Result<Vec<StorageEntry>>
	{
		self.scan(|entry| entry.definition.contains(text))
	}

	fn find_all(&self) -> Result<Vec<StorageEntry>>
	{
		self.scan(|_| true)
	}

	fn insert(&self, entry: &StorageEntry) -> Result<EntryId>
	{
		let id = self.generate_id()?;
		self.entries.insert(key(id), encode_entry(entry)?)
			.map_err(sled_error_map)?;
		Ok(EntryId(id))
	}

	fn update(&self, id: EntryId, entry: &StorageEntry) -> Result<u64>
	{
		let value = encode_entry(entry)?;
		let updated = self.entries
			.update_and_fetch(key(id.0), |old| old.map(|_| value.clone()))
			.map_err(sled_error_map)?;
		Ok(updated.map_or(0, |_| 1))
	}

	fn delete(&self, id: EntryId) -> Result<u64>
	{
		let removed = self.entries.remove(key(id.0)).map_err(sled_error_map)?;
		let mut links = vec![];
		for item in self.tag_entries.iter() {
			let (link, _) = item.map_err(sled_error_map)?;
			if read_key(&link[8..]) == id.0 {
				links.push(link);
			}
		}
		for link in links {
			self.tag_entries.remove(link).map_err(sled_error_map)?;
		}
		Ok(removed.map_or(0, |_| 1))
	}

	fn find_tag_id(&self, name: &str) -> Result<Option<TagId>>
	{
		Ok(self.tags.id(name)?.map(TagId))
	}

	fn tag_name(&self, tag: TagId) -> Result<Option<String>>
	{
		self.tags.name(tag.0)
	}

	fn define_tag(&self, name: &str) -> Result<TagId>
	{
		if let Some(id) = self.tags.id(name)? {
			return Ok(TagId(id));
		}
		let candidate = self.generate_id()?;
		self.tags.define(name, candidate).map(TagId)
	}

	fn tag_entry(&self, id: EntryId, tag: TagId) -> Result<u64>
	{
		if !self.entries.contains_key(key(id.0)).map_err(sled_error_map)? {
			return Err(Error::NotFound { what: "entry", key: id.to_string() });
		}
		let mut link = [0; 16];
		BigEndian::write_u64(&mut link[..8], tag.0 as u64);
		BigEndian::write_u64(&mut link[8..], id.0 as u64);
		let previous = self.tag_entries.insert(&link[..], &b""[..])
			.map_err(sled_error_map)?;
		Ok(if previous.is_some() { 0 } else { 1 })
	}
}

#[inline]
fn open_tree(db: &Db, name: &str) -> Result<Tree>
{
	db.open_tree(name).map_err(sled_error_map)
}

#[inline]
fn key(id: i64) -> [u8; 8]
{
	let mut buf = [0; 8];
	BigEndian::write_u64(&mut buf, id as u64);
	buf
}

#[inline]
fn read_key(buf: &[u8]) -> i64
{
	BigEndian::read_u64(&buf[..8]) as i64
}

fn encode_entry(entry: &StorageEntry) -> Result<Vec<u8>>
{
	let record = Record {
		headword: entry.headword.clone(),
		wordtype: entry.word_class,
		definition: entry.definition.clone(),
		hw_lang: entry.headword_language,
		def_lang: entry.definition_language,
	};
	serde_json::to_vec(&record).map_err(json_error_map)
}

fn decode_entry(key: &[u8], value: &IVec) -> Result<StorageEntry>
{
	let record: Record = serde_json::from_slice(value).map_err(json_error_map)?;
	Ok(StorageEntry {
		id: Some(EntryId(read_key(key))),
		headword: record.headword,
		word_class: record.wordtype,
		definition: record.definition,
		headword_language: record.hw_lang,
		definition_language: record.def_lang,
	})
}

#[inline]
fn sled_error_map(error: sled::Error) -> Error
{
	Error::Store(error.to_string())
}

#[inline]
fn json_error_map(error: serde_json::Error) -> Error
{
	Error::Store(format!("invalid entry record: {error}"))
}
