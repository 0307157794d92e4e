use std::fmt::{Display, Formatter};

use tracing::{debug, warn};

use crate::code_table::{CodeSpace, CodeTable};
use crate::entry::{EntryId, HumanEntry};
use crate::error::{Error, Result};
use crate::merge::merge;
use crate::normalize::Normalizer;
use crate::store::EntryStore;

/// Search strategies, in the precedence their results are merged by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
	Headword,
	Tag,
	WordClass,
	Definition,
}

impl Strategy {
	pub const ALL: [Strategy; 4] = [
		Strategy::Headword,
		Strategy::Tag,
		Strategy::WordClass,
		Strategy::Definition,
	];

	#[inline]
	pub fn name(&self) -> &'static str
	{
		match self {
			Strategy::Headword => "headword",
			Strategy::Tag => "tag",
			Strategy::WordClass => "wordtype",
			Strategy::Definition => "definition",
		}
	}
}

impl Display for Strategy {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		f.write_str(self.name())
	}
}

#[derive(Debug)]
pub struct StrategyFailure {
	pub strategy: Strategy,
	pub error: Error,
}

/// Merged search results plus the strategies that were skipped on error.
#[derive(Debug)]
pub struct SearchOutcome {
	pub entries: Vec<HumanEntry>,
	pub failures: Vec<StrategyFailure>,
}

impl SearchOutcome {
	#[inline]
	pub fn is_degraded(&self) -> bool
	{
		!self.failures.is_empty()
	}
}

/// Result of a multi-id fetch: what resolved, and why the rest did not.
#[derive(Debug, Default)]
pub struct Fetched {
	pub entries: Vec<HumanEntry>,
	pub failures: Vec<(EntryId, Error)>,
}

impl Fetched {
	#[inline]
	pub fn partial_failure(&self) -> bool
	{
		!self.failures.is_empty()
	}
}

pub struct SearchDispatcher<'a, S: EntryStore + ?Sized, C: CodeTable + ?Sized> {
	store: &'a S,
	codes: &'a C,
}

impl<'a, S: EntryStore + ?Sized, C: CodeTable + ?Sized> SearchDispatcher<'a, S, C> {
	#[inline]
	pub fn new(store: &'a S, codes: &'a C) -> Self
	{
		SearchDispatcher { store, codes }
	}

	#[inline]
	pub fn search(&self, token: &str) -> Vec<HumanEntry>
	{
		self.search_detailed(token).entries
	}

	/// Runs every strategy for `token`. A strategy that errors contributes
	/// nothing and is listed in `failures`; the search itself never fails.
	pub fn search_detailed(&self, token: &str) -> SearchOutcome
	{
		let mut contributions = Vec::with_capacity(Strategy::ALL.len());
		let mut failures = vec![];
		for strategy in Strategy::ALL {
			match self.run(strategy, token) {
				Ok(entries) => contributions.push(entries),
				Err(error) => {
					warn!(strategy = strategy.name(), token, error = %error, "search strategy failed");
					failures.push(StrategyFailure { strategy, error });
				}
			}
		}
		SearchOutcome { entries: merge(contributions), failures }
	}

	fn run(&self, strategy: Strategy, token: &str) -> Result<Vec<HumanEntry>>
	{
		let found = match strategy {
			Strategy::Headword => self.store.find_by_headword(token)?,
			Strategy::Tag => match self.store.find_tag_id(token)? {
				Some(tag) => self.store.find_by_tag_id(tag)?,
				None => {
					debug!(token, "no tag named by search token");
					return Ok(vec![]);
				}
			}
			Strategy::WordClass => match self.codes.resolve_id(CodeSpace::WordClass, token)? {
				Some(word_class) => self.store.find_by_word_class_id(word_class)?,
				None => {
					debug!(token, "no word class named by search token");
					return Ok(vec![]);
				}
			}
			// every definition contains the empty string
			Strategy::Definition if token.is_empty() => return Ok(vec![]),
			Strategy::Definition => self.store.find_by_definition_contains(token)?,
		};
		Normalizer::new(self.codes).to_human_readable_all(&found)
	}

	/// Single-entity lookup: not found and store failures are both errors.
	pub fn fetch_one(&self, id: EntryId) -> Result<HumanEntry>
	{
		match self.store.find_by_id(id)? {
			Some(entry) => Normalizer::new(self.codes).to_human_readable(&entry),
			None => Err(Error::NotFound { what: "entry", key: id.to_string() }),
		}
	}

	/// Looks up each id on its own. Ids that fail are collected with their
	/// error rather than failing the batch, except when only one id is asked
	/// for, which behaves as `fetch_one`.
	pub fn fetch_by_id(&self, ids: &[EntryId]) -> Result<Fetched>
	{
		if let [id] = ids {
			let entry = self.fetch_one(*id)?;
			return Ok(Fetched { entries: vec![entry], failures: vec![] });
		}
		let mut fetched = Fetched::default();
		for &id in ids {
			match self.fetch_one(id) {
				Ok(entry) => fetched.entries.push(entry),
				Err(error) => {
					warn!(%id, error = %error, "entry fetch failed");
					fetched.failures.push((id, error));
				}
			}
		}
		Ok(fetched)
	}

	pub fn list_all(&self) -> Result<Vec<HumanEntry>>
	{
		let entries = self.store.find_all()?;
		Normalizer::new(self.codes).to_human_readable_all(&entries)
	}

	/// Entries whose headword starts with `prefix` in lower or upper case.
	pub fn search_by_initial(&self, prefix: &str) -> Result<Vec<HumanEntry>>
	{
		if prefix.is_empty() {
			return Err(Error::Validation("search prefix is empty".to_owned()));
		}
		let lower = prefix.to_lowercase();
		let upper = prefix.to_uppercase();
		let mut found = vec![self.store.find_by_headword_prefix(&lower)?];
		if upper != lower {
			found.push(self.store.find_by_headword_prefix(&upper)?);
		}
		Normalizer::new(self.codes).to_human_readable_all(&merge(found))
	}
}
