use tracing::debug;

use crate::code_table::{CodeSpace, CodeTable};
use crate::config::{Config, Engine};
use crate::entry::{CodeId, EntryId, HumanEntry, TagId};
use crate::error::{Error, Result};
use crate::search::{Fetched, SearchDispatcher, SearchOutcome};
use crate::store::EntryStore;
use crate::upsert::{UpsertResolver, Upserted};

/// A store that is also its own code table, shareable across threads.
pub trait Backend: EntryStore + CodeTable + Send + Sync {}

impl<T: EntryStore + CodeTable + Send + Sync> Backend for T {}

/// Caller-facing operations over one opened backend.
///
/// Holds nothing but the backend; every call builds its dispatcher or
/// resolver afresh, so a `Lexicon` can be shared between threads as is.
pub struct Lexicon {
	backend: Box<dyn Backend>,
}

impl Lexicon {
	pub fn new(backend: impl Backend + 'static) -> Self
	{
		Lexicon { backend: Box::new(backend) }
	}

	pub fn open(config: &Config) -> Result<Self>
	{
		let engine = config.database.engine;
		let path = config.database_path()?;
		debug!(%engine, path = %path.display(), "opening lexicon");
		match engine {
			#[cfg(feature = "sqlite")]
			Engine::Sqlite => Ok(Lexicon::new(crate::store_sqlite::SqliteStore::open(path)?)),
			#[cfg(feature = "sled")]
			Engine::Sled => Ok(Lexicon::new(crate::store_sled::SledStore::open(path)?)),
			#[allow(unreachable_patterns)]
			engine => Err(Error::Config(format!("{engine} support is not compiled in"))),
		}
	}

	#[cfg(feature = "sqlite")]
	pub fn in_memory() -> Result<Self>
	{
		Ok(Lexicon::new(crate::store_sqlite::SqliteStore::in_memory()?))
	}

	#[inline]
	fn dispatcher(&self) -> SearchDispatcher<'_, dyn Backend, dyn Backend>
	{
		SearchDispatcher::new(&*self.backend, &*self.backend)
	}

	#[inline]
	fn resolver(&self) -> UpsertResolver<'_, dyn Backend, dyn Backend>
	{
		UpsertResolver::new(&*self.backend, &*self.backend)
	}

	pub fn search(&self, token: &str) -> Vec<HumanEntry>
	{
		self.dispatcher().search(token)
	}

	pub fn search_detailed(&self, token: &str) -> SearchOutcome
	{
		self.dispatcher().search_detailed(token)
	}

	pub fn search_by_initial(&self, prefix: &str) -> Result<Vec<HumanEntry>>
	{
		self.dispatcher().search_by_initial(prefix)
	}

	pub fn fetch_by_id(&self, ids: &[EntryId]) -> Result<Fetched>
	{
		self.dispatcher().fetch_by_id(ids)
	}

	pub fn list_all(&self) -> Result<Vec<HumanEntry>>
	{
		self.dispatcher().list_all()
	}

	pub fn upsert(&self, entry: &HumanEntry) -> Result<Upserted>
	{
		self.resolver().upsert(entry)
	}

	pub fn delete(&self, id: EntryId) -> Result<u64>
	{
		self.resolver().delete(id)
	}

	pub fn define_code(&self, space: CodeSpace, name: &str) -> Result<CodeId>
	{
		if name.trim().is_empty() {
			return Err(Error::Validation(format!("{space} name is empty")));
		}
		self.backend.define(space, name)
	}

	pub fn define_tag(&self, name: &str) -> Result<TagId>
	{
		if name.trim().is_empty() {
			return Err(Error::Validation("tag name is empty".to_owned()));
		}
		self.backend.define_tag(name)
	}

	/// Puts entry `id` under the existing tag `tag`.
	pub fn tag_entry(&self, id: EntryId, tag: &str) -> Result<u64>
	{
		let tag_id = self.backend.find_tag_id(tag)?
			.ok_or_else(|| Error::NotFound { what: "tag", key: tag.to_owned() })?;
		self.backend.tag_entry(id, tag_id)
	}

	pub fn tag_name(&self, tag: TagId) -> Result<String>
	{
		self.backend.tag_name(tag)?
			.ok_or_else(|| Error::NotFound { what: "tag", key: tag.to_string() })
	}
}
