use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use crate::code_table::{CodeSpace, CodeTable};
use crate::entry::{CodeId, EntryId, StorageEntry, TagId};
use crate::error::{Error, Result};
use crate::store::EntryStore;

const ENTRY_COLUMNS: &str = "entries.entry_id, entries.headword, entries.wordtype, \
	entries.definition, entries.hw_lang, entries.def_lang";

/// Entry store and code table kept in one SQLite database.
pub struct SqliteStore {
	db: Mutex<Connection>,
}

impl SqliteStore {
	pub fn open(path: impl AsRef<Path>) -> Result<Self>
	{
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		let db = Connection::open(path).map_err(sqlite_error_map)?;
		Self::with_connection(db)
	}

	pub fn in_memory() -> Result<Self>
	{
		let db = Connection::open_in_memory().map_err(sqlite_error_map)?;
		Self::with_connection(db)
	}

	fn with_connection(db: Connection) -> Result<Self>
	{
		init_db(&db)?;
		Ok(SqliteStore { db: Mutex::new(db) })
	}

	#[inline]
	fn lock(&self) -> Result<MutexGuard<'_, Connection>>
	{
		self.db.lock()
			.map_err(|_| Error::Store("sqlite connection lock poisoned".to_owned()))
	}

	fn query_entries<P: Params>(&self, sql: &str, params: P) -> Result<Vec<StorageEntry>>
	{
		let db = self.lock()?;
		query_entries(&db, sql, params).map_err(sqlite_error_map)
	}
}

impl CodeTable for SqliteStore {
	fn resolve_id(&self, space: CodeSpace, name: &str) -> Result<Option<CodeId>>
	{
		let (table, id_column, name_column) = code_table(space);
		let db = self.lock()?;
		db.query_row(
			&format!("select {id_column} from {table} where {name_column} = ?1"),
			[name],
			|row| row.get(0))
			.optional()
			.map(|id| id.map(CodeId))
			.map_err(sqlite_error_map)
	}

	fn resolve_name(&self, space: CodeSpace, id: CodeId) -> Result<Option<String>>
	{
		let (table, id_column, name_column) = code_table(space);
		let db = self.lock()?;
		db.query_row(
			&format!("select {name_column} from {table} where {id_column} = ?1"),
			[id.0],
			|row| row.get(0))
			.optional()
			.map_err(sqlite_error_map)
	}

	fn define(&self, space: CodeSpace, name: &str) -> Result<CodeId>
	{
		let (table, id_column, name_column) = code_table(space);
		let db = self.lock()?;
		db.execute(&format!("insert or ignore into {table} ({name_column}) values (?1)"), [name])
			.map_err(sqlite_error_map)?;
		db.query_row(
			&format!("select {id_column} from {table} where {name_column} = ?1"),
			[name],
			|row| row.get(0))
			.map(CodeId)
			.map_err(sqlite_error_map)
	}
}

impl EntryStore for SqliteStore {
	fn find_by_id(&self, id: EntryId) -> Result<Option<StorageEntry>>
	{
		let db = self.lock()?;
		db.query_row(
			&format!("select {ENTRY_COLUMNS} from entries where entry_id = ?1"),
			[id.0],
			row_to_entry)
			.optional()
			.map_err(sqlite_error_map)
	}

	fn find_by_headword(&self, headword: &str) -> Result<Vec<StorageEntry>>
	{
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entries where headword = ?1 order by entry_id"),
			[headword])
	}

	fn find_by_headword_prefix(&self, prefix: &str) -> Result<Vec<StorageEntry>>
	{
		// like is case-insensitive and treats % and _ as wildcards
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entries
				where substr(headword, 1, length(?1)) = ?1 order by entry_id"),
			[prefix])
	}

	fn find_by_tag_id(&self, tag: TagId) -> Result<Vec<StorageEntry>>
	{
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entry_tags
				join entries on entry_tags.entry_id = entries.entry_id
				where entry_tags.tag_id = ?1 order by entries.entry_id"),
			[tag.0])
	}

	fn find_by_word_class_id(&self, word_class: CodeId) -> Result<Vec<StorageEntry>>
	{
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entries where wordtype = ?1 order by entry_id"),
			[word_class.0])
	}

	fn find_by_definition_contains(&self, text: &str) -> Result<Vec<StorageEntry>>
	{
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entries
				where instr(definition, ?1) > 0 order by entry_id"),
			[text])
	}

	fn find_all(&self) -> Result<Vec<StorageEntry>>
	{
		self.query_entries(
			&format!("select {ENTRY_COLUMNS} from entries order by entry_id"),
			())
	}

	fn insert(&self, entry: &StorageEntry) -> Result<EntryId>
	{
		let db = self.lock()?;
		db.execute(
			"insert into entries (headword, wordtype, definition, hw_lang, def_lang)
				values (?1, ?2, ?3, ?4, ?5)",
			params![
				entry.headword,
				entry.word_class.0,
				entry.definition,
				entry.headword_language.0,
				entry.definition_language.0,
			])
			.map_err(sqlite_error_map)?;
		Ok(EntryId(db.last_insert_rowid()))
	}

	fn update(&self, id: EntryId, entry: &StorageEntry) -> Result<u64>
	{
		let db = self.lock()?;
		let affected = db.execute(
			"update entries
				set headword = ?1, wordtype = ?2, definition = ?3, hw_lang = ?4, def_lang = ?5
				where entry_id = ?6",
			params![
				entry.headword,
				entry.word_class.0,
				entry.definition,
				entry.headword_language.0,
				entry.definition_language.0,
				id.0,
			])
			.map_err(sqlite_error_map)?;
		Ok(affected as u64)
	}

	fn delete(&self, id: EntryId) -> Result<u64>
	{
		let mut db = self.lock()?;
		let tx = db.transaction().map_err(sqlite_error_map)?;
		tx.execute("delete from entry_tags where entry_id = ?1", [id.0])
			.map_err(sqlite_error_map)?;
		let affected = tx.execute("delete from entries where entry_id = ?1", [id.0])
			.map_err(sqlite_error_map)?;
		tx.commit().map_err(sqlite_error_map)?;
		Ok(affected as u64)
	}

	fn find_tag_id(&self, name: &str) -> Result<Option<TagId>>
	{
		let db = self.lock()?;
		db.query_row("select tag_id from tags where name = ?1", [name], |row| row.get(0))
			.optional()
			.map(|id| id.map(TagId))
			.map_err(sqlite_error_map)
	}

	fn tag_name(&self, tag: TagId) -> Result<Option<String>>
	{
		let db = self.lock()?;
		db.query_row("select name from tags where tag_id = ?1", [tag.0], |row| row.get(0))
			.optional()
			.map_err(sqlite_error_map)
	}

	fn define_tag(&self, name: &str) -> Result<TagId>
	{
		let db = self.lock()?;
		db.execute("insert or ignore into tags (name) values (?1)", [name])
			.map_err(sqlite_error_map)?;
		db.query_row("select tag_id from tags where name = ?1", [name], |row| row.get(0))
			.map(TagId)
			.map_err(sqlite_error_map)
	}

	fn tag_entry(&self, id: EntryId, tag: TagId) -> Result<u64>
	{
		let db = self.lock()?;
		let exists = db.query_row("select 1 from entries where entry_id = ?1", [id.0], |_| Ok(()))
			.optional()
			.map_err(sqlite_error_map)?;
		if exists.is_none() {
			return Err(Error::NotFound { what: "entry", key: id.to_string() });
		}
		let affected = db.execute(
			"insert or ignore into entry_tags (entry_id, tag_id) values (?1, ?2)",
			[id.0, tag.0])
			.map_err(sqlite_error_map)?;
		Ok(affected as u64)
	}
}

/// Table, id column and name column backing a code space.
#[inline]
fn code_table(space: CodeSpace) -> (&'static str, &'static str, &'static str)
{
	match space {
		CodeSpace::WordClass => ("wordtypes", "wordtype_id", "name"),
		CodeSpace::Language => ("languages", "lang_id", "code"),
	}
}

fn init_db(db: &Connection) -> Result<()>
{
	db.execute_batch(
		"pragma foreign_keys = on;
			create table if not exists wordtypes(wordtype_id integer primary key, name text not null unique);
			create table if not exists languages(lang_id integer primary key, code text not null unique);
			create table if not exists tags(tag_id integer primary key, name text not null unique);
			create table if not exists entries(
				entry_id integer primary key,
				headword text not null,
				wordtype integer not null references wordtypes(wordtype_id),
				definition text not null,
				hw_lang integer not null references languages(lang_id),
				def_lang integer not null references languages(lang_id));
			create index if not exists entries_headword_idx on entries(headword);
			create index if not exists entries_wordtype_idx on entries(wordtype);
			create table if not exists entry_tags(
				entry_id integer not null,
				tag_id integer not null,
				primary key (entry_id, tag_id));
			create index if not exists entry_tags_tag_idx on entry_tags(tag_id);")
		.map_err(sqlite_error_map)
}

fn query_entries<P: Params>(db: &Connection, sql: &str, params: P)
	-> core::result::Result<Vec<StorageEntry>, rusqlite::Error>
{
	let mut stmt = db.prepare(sql)?;
	let entries = stmt.query_map(params, row_to_entry)?
		.collect::<core::result::Result<Vec<_>, _>>()?;
	Ok(entries)
}

fn row_to_entry(row: &Row) -> core::result::Result<StorageEntry, rusqlite::Error>
{
	Ok(StorageEntry {
		id: Some(EntryId(row.get(0)?)),
		headword: row.get(1)?,
		word_class: CodeId(row.get(2)?),
		definition: row.get(3)?,
		headword_language: CodeId(row.get(4)?),
		definition_language: CodeId(row.get(5)?),
	})
}

#[inline]
fn sqlite_error_map(error: rusqlite::Error) -> Error
{
	Error::Store(error.to_string())
}
