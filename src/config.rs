//! Manager configuration.
//!
//! A small TOML file:
//!
//! ```toml
//! plugins-dir = "/opt/app/plugins"
//!
//! [settings]
//! theme = "dark"
//! ```

use std::collections::BTreeMap ;
use std::path::{ Path, PathBuf };
use serde::Deserialize ;
use thiserror::Error ;



/// Name of the directory, next to the executable, plugins are looked up in by default.
pub const PLUGINS_DIR_NAME: &str = "plugins" ;

/// Errors reading a [`ManagerConfig`].
#[derive( Debug, Error )]
pub enum ConfigError {
	/// The file could not be read.
	#[error( "Failed to read config {}: {source}", path.display() )]
	Io { path: PathBuf, #[source] source: std::io::Error },
	/// The contents are not a valid configuration.
	#[error( "Invalid config: {0}" )] Parse( #[from] toml::de::Error ),
}

/// Settings applied through [`PluginManager::configure`]( crate::PluginManager::configure ).
#[derive( Debug, Clone, Default, PartialEq, Eq, Deserialize )]
#[serde( rename_all = "kebab-case", deny_unknown_fields )]
pub struct ManagerConfig {
	/// Directory scanned for plugins. Falls back to [`default_plugins_dir`].
	#[serde( default )]
	pub plugins_dir: Option<PathBuf>,
	/// Initial values for the settings store handed to plugins.
	#[serde( default )]
	pub settings: BTreeMap<String, String>,
}

impl ManagerConfig {

	/// Reads a configuration file.
	///
	/// # Errors
	/// Fails if the file can't be read or isn't valid TOML for this structure.
	pub fn from_file( path: impl AsRef<Path> ) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string( path )
			.map_err(| source | ConfigError::Io { path: path.to_path_buf(), source })?;
		Self::from_toml_str( &contents )
	}

	/// Parses a configuration from TOML text.
	///
	/// # Errors
	/// Fails if the text isn't valid TOML for this structure.
	pub fn from_toml_str( contents: &str ) -> Result<Self, ConfigError> {
		Ok( toml::from_str( contents )? )
	}

	/// The configured plugin directory, or [`default_plugins_dir`].
	pub fn resolved_plugins_dir( &self ) -> PathBuf {
		self.plugins_dir.clone().unwrap_or_else( default_plugins_dir )
	}

}

/// `plugins` next to the running executable, or in the working directory when
/// the executable's location is unknown.
pub fn default_plugins_dir() -> PathBuf {
	std::env::current_exe()
		.ok()
		.and_then(| exe | exe.parent().map( Path::to_path_buf ))
		.unwrap_or_default()
		.join( PLUGINS_DIR_NAME )
}
