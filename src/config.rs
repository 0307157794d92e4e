use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DATA_FOLDER: &str = "yugur";

/// Storage engine behind a lexicon. Only engines enabled as cargo features
/// can be opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
	#[default]
	Sqlite,
	Sled,
}

impl Engine {
	#[inline]
	pub fn name(&self) -> &'static str
	{
		match self {
			Engine::Sqlite => "sqlite",
			Engine::Sled => "sled",
		}
	}

	#[inline]
	fn file_name(&self) -> &'static str
	{
		match self {
			Engine::Sqlite => "dictionary.sqlite",
			Engine::Sled => "dictionary.sled",
		}
	}
}

impl Display for Engine {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
	{
		f.write_str(self.name())
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
	#[serde(default)]
	pub engine: Engine,
	/// Falls back to `default_database_path` when absent.
	#[serde(default)]
	pub path: Option<PathBuf>,
}

/// ```json
/// { "database": { "engine": "sqlite", "path": "/var/lib/yugur/dictionary.sqlite" } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub database: DatabaseConfig,
}

impl Config {
	pub fn load(path: impl AsRef<Path>) -> Result<Config>
	{
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		serde_json::from_slice(&bytes)
			.map_err(|e| Error::Config(format!("{}: {e}", path.display())))
	}

	/// The configured database path, or the engine's default location.
	pub fn database_path(&self) -> Result<PathBuf>
	{
		match &self.database.path {
			Some(path) => Ok(path.clone()),
			None => default_database_path(self.database.engine),
		}
	}
}

/// `<user data dir>/yugur/dictionary.<engine>`
pub fn default_database_path(engine: Engine) -> Result<PathBuf>
{
	let mut path = dirs::data_dir().ok_or(Error::NoDataDir)?;
	path.push(DATA_FOLDER);
	path.push(engine.file_name());
	Ok(path)
}
