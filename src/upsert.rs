use tracing::debug;

use crate::code_table::CodeTable;
use crate::entry::{EntryId, HumanEntry};
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::store::EntryStore;

/// What an upsert did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upserted {
	Inserted { id: EntryId },
	/// `affected` is 0 when no entry had the id.
	Updated { id: EntryId, affected: u64 },
}

impl Upserted {
	#[inline]
	pub fn affected(&self) -> u64
	{
		match self {
			Upserted::Inserted { .. } => 1,
			Upserted::Updated { affected, .. } => *affected,
		}
	}

	#[inline]
	pub fn id(&self) -> EntryId
	{
		match self {
			Upserted::Inserted { id } | Upserted::Updated { id, .. } => *id,
		}
	}
}

pub struct UpsertResolver<'a, S: EntryStore + ?Sized, C: CodeTable + ?Sized> {
	store: &'a S,
	codes: &'a C,
}

impl<'a, S: EntryStore + ?Sized, C: CodeTable + ?Sized> UpsertResolver<'a, S, C> {
	#[inline]
	pub fn new(store: &'a S, codes: &'a C) -> Self
	{
		UpsertResolver { store, codes }
	}

	/// Inserts `entry` when it has no id, otherwise overwrites the entry with
	/// that id. Nothing is written unless every code resolves.
	pub fn upsert(&self, entry: &HumanEntry) -> Result<Upserted>
	{
		entry.validate()?;
		let stored = Normalizer::new(self.codes)
			.to_storage(entry)
			.map_err(|e| match e {
				Error::UnresolvedCode { .. } => Error::Validation(e.to_string()),
				e => e,
			})?;

		let upserted = match stored.id {
			None => Upserted::Inserted { id: self.store.insert(&stored)? },
			Some(id) => Upserted::Updated { id, affected: self.store.update(id, &stored)? },
		};
		debug!(headword = %entry.headword, ?upserted, "entry written");
		Ok(upserted)
	}

	/// Deleting an unknown id is not an error, it affects 0 rows.
	pub fn delete(&self, id: EntryId) -> Result<u64>
	{
		let affected = self.store.delete(id)?;
		debug!(%id, affected, "entry deleted");
		Ok(affected)
	}
}
