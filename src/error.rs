use thiserror::Error;

use crate::code_table::CodeSpace;

#[derive(Debug, Error)]
pub enum Error {
	#[error("No {what} found for {key}")]
	NotFound { what: &'static str, key: String },

	#[error("Unresolved {space} code: {value}")]
	UnresolvedCode { space: CodeSpace, value: String },

	#[error("Invalid entry: {0}")]
	Validation(String),

	#[error("Store failure: {0}")]
	Store(String),

	#[error("Invalid config: {0}")]
	Config(String),

	#[error("Failed get user data folder")]
	NoDataDir,

	#[error("Error when accessing file: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	#[inline]
	pub fn is_not_found(&self) -> bool
	{
		matches!(self, Error::NotFound { .. })
	}
}

pub type Result<T> = std::result::Result<T, Error>;
