use crate::code_table::{CodeSpace, CodeTable};
use crate::entry::{CodeId, HumanEntry, StorageEntry};
use crate::error::{Error, Result};

/// Translates entries between their human-readable and storage forms.
///
/// Either every code resolves or the translation fails as a whole; a partly
/// translated entry is never returned.
pub struct Normalizer<'a, C: CodeTable + ?Sized> {
	codes: &'a C,
}

impl<'a, C: CodeTable + ?Sized> Normalizer<'a, C> {
	#[inline]
	pub fn new(codes: &'a C) -> Self
	{
		Normalizer { codes }
	}

	pub fn to_storage(&self, entry: &HumanEntry) -> Result<StorageEntry>
	{
		let word_class = self.id_of(CodeSpace::WordClass, &entry.word_class)?;
		let headword_language = self.id_of(CodeSpace::Language, &entry.headword_language)?;
		let definition_language = self.id_of(CodeSpace::Language, &entry.definition_language)?;
		Ok(StorageEntry {
			id: entry.id,
			headword: entry.headword.clone(),
			word_class,
			definition: entry.definition.clone(),
			headword_language,
			definition_language,
		})
	}

	pub fn to_human_readable(&self, entry: &StorageEntry) -> Result<HumanEntry>
	{
		let word_class = self.name_of(CodeSpace::WordClass, entry.word_class)?;
		let headword_language = self.name_of(CodeSpace::Language, entry.headword_language)?;
		let definition_language = self.name_of(CodeSpace::Language, entry.definition_language)?;
		Ok(HumanEntry {
			id: entry.id,
			headword: entry.headword.clone(),
			word_class,
			definition: entry.definition.clone(),
			headword_language,
			definition_language,
		})
	}

	/// Fails on the first entry that does not translate.
	pub fn to_human_readable_all(&self, entries: &[StorageEntry]) -> Result<Vec<HumanEntry>>
	{
		entries.iter()
			.map(|entry| self.to_human_readable(entry))
			.collect()
	}

	fn id_of(&self, space: CodeSpace, name: &str) -> Result<CodeId>
	{
		self.codes.resolve_id(space, name)?
			.ok_or_else(|| Error::UnresolvedCode { space, value: name.to_owned() })
	}

	fn name_of(&self, space: CodeSpace, id: CodeId) -> Result<String>
	{
		self.codes.resolve_name(space, id)?
			.ok_or_else(|| Error::UnresolvedCode { space, value: id.to_string() })
	}
}
