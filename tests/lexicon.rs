#![cfg(feature = "sqlite")]

use std::collections::HashSet;

use yugur::store_sqlite::SqliteStore;
use yugur::{
	CodeId, CodeSpace, CodeTable, Config, EntryId, EntryStore, Error, HumanEntry, Lexicon,
	Result, StorageEntry, Strategy, TagId, Upserted,
};

/// Delegates to sqlite, failing the operations named in `fail` and
/// pretending the languages in `hidden` have no name.
struct Flaky {
	inner: SqliteStore,
	fail: HashSet<&'static str>,
	hidden: HashSet<CodeId>,
}

impl Flaky {
	fn new(inner: SqliteStore, fail: &[&'static str]) -> Self
	{
		Flaky { inner, fail: fail.iter().copied().collect(), hidden: HashSet::new() }
	}

	fn hiding_language(mut self, id: CodeId) -> Self
	{
		self.hidden.insert(id);
		self
	}

	fn check(&self, op: &'static str) -> Result<()>
	{
		if self.fail.contains(op) {
			Err(Error::Store(format!("{op} unavailable")))
		} else {
			Ok(())
		}
	}
}

impl CodeTable for Flaky {
	fn resolve_id(&self, space: CodeSpace, name: &str) -> Result<Option<CodeId>>
	{
		self.check("resolve_id")?;
		self.inner.resolve_id(space, name)
	}

	fn resolve_name(&self, space: CodeSpace, id: CodeId) -> Result<Option<String>>
	{
		self.check("resolve_name")?;
		if space == CodeSpace::Language && self.hidden.contains(&id) {
			return Ok(None);
		}
		self.inner.resolve_name(space, id)
	}

	fn define(&self, space: CodeSpace, name: &str) -> Result<CodeId>
	{
		self.inner.define(space, name)
	}
}

impl EntryStore for Flaky {
	fn find_by_id(&self, id: EntryId) -> Result<Option<StorageEntry>>
	{
		self.check("find_by_id")?;
		self.inner.find_by_id(id)
	}

	fn find_by_headword(&self, headword: &str) -> Result<Vec<StorageEntry>>
	{
		self.check("find_by_headword")?;
		self.inner.find_by_headword(headword)
	}

	fn find_by_headword_prefix(&self, prefix: &str) -> Result<Vec<StorageEntry>>
	{
		self.inner.find_by_headword_prefix(prefix)
	}

	fn find_by_tag_id(&self, tag: TagId) -> Result<Vec<StorageEntry>>
	{
		self.check("find_by_tag_id")?;
		self.inner.find_by_tag_id(tag)
	}

	fn find_by_word_class_id(&self, word_class: CodeId) -> Result<Vec<StorageEntry>>
	{
		self.check("find_by_word_class_id")?;
		self.inner.find_by_word_class_id(word_class)
	}

	fn find_by_definition_contains(&self, text: &str) -> Result<Vec<StorageEntry>>
	{
		self.check("find_by_definition_contains")?;
		self.inner.find_by_definition_contains(text)
	}

	fn find_all(&self) -> Result<Vec<StorageEntry>>
	{
		self.check("find_all")?;
		self.inner.find_all()
	}

	fn insert(&self, entry: &StorageEntry) -> Result<EntryId>
	{
		self.check("insert")?;
		self.inner.insert(entry)
	}

	fn update(&self, id: EntryId, entry: &StorageEntry) -> Result<u64>
	{
		self.check("update")?;
		self.inner.update(id, entry)
	}

	fn delete(&self, id: EntryId) -> Result<u64>
	{
		self.check("delete")?;
		self.inner.delete(id)
	}

	fn find_tag_id(&self, name: &str) -> Result<Option<TagId>>
	{
		self.check("find_tag_id")?;
		self.inner.find_tag_id(name)
	}

	fn tag_name(&self, tag: TagId) -> Result<Option<String>>
	{
		self.inner.tag_name(tag)
	}

	fn define_tag(&self, name: &str) -> Result<TagId>
	{
		self.inner.define_tag(name)
	}

	fn tag_entry(&self, id: EntryId, tag: TagId) -> Result<u64>
	{
		self.inner.tag_entry(id, tag)
	}
}

fn seeded_store() -> SqliteStore
{
	let store = SqliteStore::in_memory().unwrap();
	for word_class in ["noun", "verb"] {
		store.define(CodeSpace::WordClass, word_class).unwrap();
	}
	for language in ["en", "fr"] {
		store.define(CodeSpace::Language, language).unwrap();
	}
	store
}

fn seeded_lexicon() -> Lexicon
{
	let lexicon = Lexicon::in_memory().unwrap();
	for word_class in ["noun", "verb"] {
		lexicon.define_code(CodeSpace::WordClass, word_class).unwrap();
	}
	for language in ["en", "fr"] {
		lexicon.define_code(CodeSpace::Language, language).unwrap();
	}
	lexicon
}

fn dog() -> HumanEntry
{
	HumanEntry::new("dog", "noun", "a domesticated canine", "en", "en")
}

fn inserted(lexicon: &Lexicon, entry: &HumanEntry) -> EntryId
{
	match lexicon.upsert(entry).unwrap() {
		Upserted::Inserted { id } => id,
		other => panic!("expected insert, got {other:?}"),
	}
}

fn headwords(entries: &[HumanEntry]) -> Vec<&str>
{
	entries.iter().map(|e| e.headword.as_str()).collect()
}

#[test]
fn search_returns_human_readable_entry()
{
	let lexicon = seeded_lexicon();
	let id = inserted(&lexicon, &dog());

	assert_eq!(lexicon.search("dog"), vec![dog().with_id(id)]);
}

#[test]
fn fetch_by_id_reports_missing_ids()
{
	let lexicon = seeded_lexicon();
	let id = inserted(&lexicon, &dog());
	let missing = EntryId(id.0 + 98);

	let fetched = lexicon.fetch_by_id(&[id, missing]).unwrap();
	assert_eq!(fetched.entries, vec![dog().with_id(id)]);
	assert!(fetched.partial_failure());
	assert_eq!(fetched.failures.len(), 1);
	assert_eq!(fetched.failures[0].0, missing);
	assert!(fetched.failures[0].1.is_not_found());
}

#[test]
fn fetch_by_id_keeps_every_failure()
{
	let lexicon = seeded_lexicon();
	let id = inserted(&lexicon, &dog());

	let fetched = lexicon.fetch_by_id(&[EntryId(500), id, EntryId(501)]).unwrap();
	assert_eq!(fetched.entries.len(), 1);
	let failed: Vec<_> = fetched.failures.iter().map(|(id, _)| *id).collect();
	assert_eq!(failed, [EntryId(500), EntryId(501)]);

	let fetched = lexicon.fetch_by_id(&[]).unwrap();
	assert!(fetched.entries.is_empty());
	assert!(!fetched.partial_failure());
}

#[test]
fn fetch_of_single_id_fails_loudly()
{
	let lexicon = seeded_lexicon();
	assert!(lexicon.fetch_by_id(&[EntryId(7)]).unwrap_err().is_not_found());

	let lexicon = Lexicon::new(Flaky::new(seeded_store(), &["find_by_id"]));
	assert!(matches!(lexicon.fetch_by_id(&[EntryId(1)]), Err(Error::Store(_))));
	let fetched = lexicon.fetch_by_id(&[EntryId(1), EntryId(2)]).unwrap();
	assert!(fetched.failures.iter().all(|(_, e)| matches!(e, Error::Store(_))));
}

#[test]
fn overlapping_strategies_keep_first_position()
{
	let lexicon = seeded_lexicon();
	let puppy = inserted(&lexicon, &HumanEntry::new("puppy", "noun", "a young one", "en", "en"));
	let hound = inserted(&lexicon, &dog());
	let chien = inserted(&lexicon, &HumanEntry::new("chien", "noun", "French for dog", "fr", "en"));
	lexicon.define_tag("dog").unwrap();
	lexicon.tag_entry(puppy, "dog").unwrap();
	lexicon.tag_entry(hound, "dog").unwrap();

	// tag order is [puppy, dog]; dog already came from the headword strategy
	let found = lexicon.search("dog");
	assert_eq!(headwords(&found), ["dog", "puppy", "chien"]);
	assert_eq!(found.iter().filter(|e| e.id == Some(hound)).count(), 1);
	assert_eq!(found[2].id, Some(chien));
}

#[test]
fn word_class_token_matches_by_class()
{
	let lexicon = seeded_lexicon();
	inserted(&lexicon, &dog());
	inserted(&lexicon, &HumanEntry::new("run", "verb", "to move fast", "en", "en"));

	assert_eq!(headwords(&lexicon.search("verb")), ["run"]);
	assert_eq!(headwords(&lexicon.search("noun")), ["dog"]);
}

#[test]
fn definition_match_is_case_sensitive()
{
	let lexicon = seeded_lexicon();
	inserted(&lexicon, &dog());

	assert_eq!(headwords(&lexicon.search("canine")), ["dog"]);
	assert!(lexicon.search("Canine").is_empty());
	assert!(lexicon.search("").is_empty());
}

#[test]
fn unknown_tag_is_not_a_failure()
{
	let lexicon = seeded_lexicon();
	inserted(&lexicon, &dog());

	let outcome = lexicon.search_detailed("dog");
	assert!(!outcome.is_degraded());
	assert_eq!(outcome.entries.len(), 1);
}

#[test]
fn failing_strategy_is_absorbed()
{
	let store = seeded_store();
	let lexicon = Lexicon::new(Flaky::new(store, &["find_tag_id", "find_by_definition_contains"]));
	let id = inserted(&lexicon, &dog());

	let outcome = lexicon.search_detailed("dog");
	assert_eq!(outcome.entries, vec![dog().with_id(id)]);
	assert!(outcome.is_degraded());
	let failed: Vec<_> = outcome.failures.iter().map(|f| f.strategy).collect();
	assert_eq!(failed, [Strategy::Tag, Strategy::Definition]);

	assert_eq!(lexicon.search("dog"), vec![dog().with_id(id)]);
}

#[test]
fn untranslatable_results_drop_only_their_strategy()
{
	let store = seeded_store();
	let fr = store.resolve_id(CodeSpace::Language, "fr").unwrap().unwrap();
	let lexicon = Lexicon::new(Flaky::new(store, &[]).hiding_language(fr));
	inserted(&lexicon, &dog());
	inserted(&lexicon, &HumanEntry::new("wolf", "noun", "a wild dog", "en", "fr"));

	let outcome = lexicon.search_detailed("dog");
	assert_eq!(headwords(&outcome.entries), ["dog"]);
	assert_eq!(outcome.failures.len(), 1);
	assert_eq!(outcome.failures[0].strategy, Strategy::Definition);
	assert!(matches!(outcome.failures[0].error, Error::UnresolvedCode { space: CodeSpace::Language, .. }));

	assert!(lexicon.list_all().is_err());
}

#[test]
fn upsert_inserts_then_updates()
{
	let lexicon = seeded_lexicon();
	let upserted = lexicon.upsert(&dog()).unwrap();
	assert_eq!(upserted.affected(), 1);
	let id = upserted.id();

	let mut changed = dog().with_id(id);
	changed.definition = "man's best friend".to_owned();
	changed.headword_language = "fr".to_owned();
	assert_eq!(lexicon.upsert(&changed).unwrap(), Upserted::Updated { id, affected: 1 });
	assert_eq!(lexicon.list_all().unwrap(), vec![changed.clone()]);

	let stray = changed.with_id(EntryId(id.0 + 41));
	assert_eq!(lexicon.upsert(&stray).unwrap().affected(), 0);
	assert_eq!(lexicon.list_all().unwrap().len(), 1);
}

#[test]
fn upsert_rejects_before_writing()
{
	let lexicon = seeded_lexicon();

	let mut unknown_language = dog();
	unknown_language.definition_language = "xx".to_owned();
	assert!(matches!(lexicon.upsert(&unknown_language), Err(Error::Validation(_))));

	let mut no_headword = dog();
	no_headword.headword.clear();
	assert!(matches!(lexicon.upsert(&no_headword), Err(Error::Validation(_))));

	assert!(lexicon.list_all().unwrap().is_empty());
}

#[test]
fn store_failure_on_write_is_not_validation()
{
	let lexicon = Lexicon::new(Flaky::new(seeded_store(), &["insert", "update", "delete"]));
	assert!(matches!(lexicon.upsert(&dog()), Err(Error::Store(_))));
	assert!(matches!(lexicon.upsert(&dog().with_id(EntryId(1))), Err(Error::Store(_))));
	assert!(matches!(lexicon.delete(EntryId(1)), Err(Error::Store(_))));

	let lexicon = Lexicon::new(Flaky::new(seeded_store(), &["resolve_id"]));
	assert!(matches!(lexicon.upsert(&dog()), Err(Error::Store(_))));
}

#[test]
fn delete_is_idempotent()
{
	let lexicon = seeded_lexicon();
	let id = inserted(&lexicon, &dog());
	assert_eq!(lexicon.delete(id).unwrap(), 1);
	assert_eq!(lexicon.delete(id).unwrap(), 0);
	assert!(lexicon.search("dog").is_empty());
}

#[test]
fn initial_search_matches_either_case()
{
	let lexicon = seeded_lexicon();
	inserted(&lexicon, &dog());
	inserted(&lexicon, &HumanEntry::new("Dingo", "noun", "a wild dog", "en", "en"));
	inserted(&lexicon, &HumanEntry::new("cat", "noun", "", "en", "en"));

	assert_eq!(headwords(&lexicon.search_by_initial("d").unwrap()), ["dog", "Dingo"]);
	assert_eq!(headwords(&lexicon.search_by_initial("D").unwrap()), ["dog", "Dingo"]);
	assert!(matches!(lexicon.search_by_initial(""), Err(Error::Validation(_))));
}

#[test]
fn tagging_needs_known_tag_and_entry()
{
	let lexicon = seeded_lexicon();
	let id = inserted(&lexicon, &dog());
	assert!(lexicon.tag_entry(id, "animals").unwrap_err().is_not_found());

	lexicon.define_tag("animals").unwrap();
	assert_eq!(lexicon.tag_entry(id, "animals").unwrap(), 1);
	assert!(lexicon.tag_entry(EntryId(id.0 + 1), "animals").unwrap_err().is_not_found());
	assert_eq!(headwords(&lexicon.search("animals")), ["dog"]);
	assert!(matches!(lexicon.define_tag(" "), Err(Error::Validation(_))));
}

#[test]
fn define_code_extends_code_table()
{
	let lexicon = seeded_lexicon();
	let mut entry = dog();
	entry.word_class = "adjective".to_owned();
	assert!(lexicon.upsert(&entry).is_err());

	lexicon.define_code(CodeSpace::WordClass, "adjective").unwrap();
	let id = lexicon.upsert(&entry).unwrap().id();
	assert_eq!(lexicon.fetch_by_id(&[id]).unwrap().entries, vec![entry.with_id(id)]);
	assert!(matches!(lexicon.define_code(CodeSpace::Language, ""), Err(Error::Validation(_))));
}

#[test]
fn tag_name_resolves_defined_tags()
{
	let lexicon = seeded_lexicon();
	let animals = lexicon.define_tag("animals").unwrap();
	assert_eq!(lexicon.tag_name(animals).unwrap(), "animals");
	assert!(lexicon.tag_name(TagId(animals.0 + 1)).unwrap_err().is_not_found());
}

#[test]
fn open_uses_configured_path()
{
	let dir = tempfile::tempdir().unwrap();
	let mut config = Config::default();
	config.database.path = Some(dir.path().join("dictionary.sqlite"));

	let id = {
		let lexicon = Lexicon::open(&config).unwrap();
		lexicon.define_code(CodeSpace::WordClass, "noun").unwrap();
		lexicon.define_code(CodeSpace::Language, "en").unwrap();
		inserted(&lexicon, &dog())
	};
	let lexicon = Lexicon::open(&config).unwrap();
	assert_eq!(lexicon.search("dog"), vec![dog().with_id(id)]);
}

#[test]
fn lexicon_is_shared_across_threads()
{
	let lexicon = seeded_lexicon();
	std::thread::scope(|scope| {
		for n in 0..4 {
			let lexicon = &lexicon;
			scope.spawn(move || {
				let entry = HumanEntry::new(format!("word{n}"), "noun", "shared", "en", "en");
				lexicon.upsert(&entry).unwrap();
				lexicon.search("shared");
			});
		}
	});
	assert_eq!(lexicon.search("shared").len(), 4);
}
