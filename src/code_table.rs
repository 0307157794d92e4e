use std::fmt::{Display, Formatter};

use crate::entry::CodeId;
use crate::error::Result;

/// The two independent lookup spaces of the code table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeSpace {
	WordClass,
	Language,
}

impl CodeSpace {
	#[inline]
	pub fn name(&self) -> &'static str
	{
		match self {
			CodeSpace::WordClass => "wordtype",
			CodeSpace::Language => "language",
		}
	}
}

impl Display for CodeSpace {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		f.write_str(self.name())
	}
}

/// Name <-> id resolution for word classes and languages.
///
/// `Ok(None)` means the name or id has no row; `Err` is a backend failure.
/// Lookups are never cached, every call reads the table as it is now.
pub trait CodeTable {
	fn resolve_id(&self, space: CodeSpace, name: &str) -> Result<Option<CodeId>>;

	fn resolve_name(&self, space: CodeSpace, id: CodeId) -> Result<Option<String>>;

	/// Adds `name` to `space` unless present; returns its id either way.
	fn define(&self, space: CodeSpace, name: &str) -> Result<CodeId>;
}
