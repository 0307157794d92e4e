use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Surrogate key assigned by the store to a persisted entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

/// Surrogate id of a word-class or language row in a code table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i64);

impl Display for EntryId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		write!(f, "{}", self.0)
	}
}

impl FromStr for EntryId {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self>
	{
		s.parse()
			.map(EntryId)
			.map_err(|_| Error::Validation(format!("invalid entry id {s:?}")))
	}
}

impl Display for CodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		write!(f, "{}", self.0)
	}
}

impl Display for TagId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		write!(f, "{}", self.0)
	}
}

/// An entry as callers see it: word class by name, languages by locale code.
///
/// `id` is `None` until the store has assigned one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanEntry {
	#[serde(default, with = "wire_id")]
	pub id: Option<EntryId>,
	pub headword: String,
	#[serde(rename = "wordtype")]
	pub word_class: String,
	pub definition: String,
	#[serde(rename = "hw_lang")]
	pub headword_language: String,
	#[serde(rename = "def_lang")]
	pub definition_language: String,
}

/// An entry as the store keeps it: word class and languages as code table ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEntry {
	pub id: Option<EntryId>,
	pub headword: String,
	pub word_class: CodeId,
	pub definition: String,
	pub headword_language: CodeId,
	pub definition_language: CodeId,
}

impl HumanEntry {
	pub fn new(headword: impl Into<String>, word_class: impl Into<String>,
		definition: impl Into<String>, headword_language: impl Into<String>,
		definition_language: impl Into<String>) -> Self
	{
		HumanEntry {
			id: None,
			headword: headword.into(),
			word_class: word_class.into(),
			definition: definition.into(),
			headword_language: headword_language.into(),
			definition_language: definition_language.into(),
		}
	}

	#[inline]
	pub fn with_id(mut self, id: EntryId) -> Self
	{
		self.id = Some(id);
		self
	}

	/// Checks the fields a write cannot do without. The definition may be empty.
	pub fn validate(&self) -> Result<()>
	{
		let required = [
			("headword", &self.headword),
			("wordtype", &self.word_class),
			("hw_lang", &self.headword_language),
			("def_lang", &self.definition_language),
		];
		for (name, value) in required {
			if value.trim().is_empty() {
				return Err(Error::Validation(format!("{name} is empty")));
			}
		}
		Ok(())
	}
}

/// `id` travels as a string, `""` standing for "not yet persisted".
mod wire_id {
	use serde::de::Error as _;
	use serde::{Deserialize, Deserializer, Serializer};

	use super::EntryId;

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(i64),
	}

	pub fn serialize<S: Serializer>(id: &Option<EntryId>, serializer: S)
		-> Result<S::Ok, S::Error>
	{
		match id {
			Some(id) => serializer.collect_str(id),
			None => serializer.serialize_str(""),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D)
		-> Result<Option<EntryId>, D::Error>
	{
		match Option::<Raw>::deserialize(deserializer)? {
			None => Ok(None),
			Some(Raw::Number(n)) => Ok(Some(EntryId(n))),
			Some(Raw::Text(s)) if s.is_empty() => Ok(None),
			Some(Raw::Text(s)) => s.parse().map(Some).map_err(D::Error::custom),
		}
	}
}
