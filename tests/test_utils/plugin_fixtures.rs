/// Creates a temporary plugin directory with one TOML manifest per entry.
///
/// ```ignore
/// let dir = plugin_dir! {
/// 	"logger" => r#"provides = [ "demo:log/sink" ]"#,
/// };
/// ```
#[macro_export]
macro_rules! plugin_dir {
	{ $( $name:literal => $manifest:expr ),* $(,)? } => {{
		let dir = $crate::plugin_fixtures::PluginDir::new();
		$( dir.add( $name, $manifest ); )*
		dir
	}};
}

#[allow( dead_code )]
mod plugin_fixtures {

	use std::path::{ Path, PathBuf };
	use std::sync::{ Arc, Mutex };
	use plugin_dock::{ AsAny, BackendError, InterfaceId, Loaded, LoaderBackend, PluginEvent, PluginHandle, PluginManager, PluginObject };

	pub const MANIFEST_EXTENSION: &str = "toml" ;

	#[derive( Debug, thiserror::Error )]
	pub enum FixtureError {
		#[error( "IO error: {0}" )] Io( #[from] std::io::Error ),
		#[error( "TOML parse error: {0}" )] Toml( #[from] toml::de::Error ),
		#[error( "Plugin is marked broken" )] Broken,
	}

	#[derive( Debug, serde::Deserialize )]
	struct PluginManifestData {
		iid: Option<String>,
		#[serde( default )]
		provides: Vec<String>,
		#[serde( default )]
		requires: Vec<String>,
		#[serde( default )]
		broken: bool,
		#[serde( default )]
		destroy_on_load: bool,
	}

	/// Plugin object built from a manifest. Keeps the handle it is given so tests
	/// can simulate its destruction.
	pub struct FixturePlugin {
		pub name: String,
		provides: Vec<InterfaceId>,
		requires: Vec<InterfaceId>,
		destroy_on_load: bool,
		handle: Mutex<Option<PluginHandle>>,
	}

	impl FixturePlugin {
		pub fn handle( &self ) -> Option<PluginHandle> {
			self.handle.lock().unwrap().clone()
		}
		pub fn destroy( &self ) -> bool {
			self.handle().is_some_and(| handle | handle.destroyed())
		}
	}

	impl PluginObject for FixturePlugin {
		fn provides( &self ) -> Vec<InterfaceId> { self.provides.clone() }
		fn required_interfaces( &self ) -> Vec<InterfaceId> { self.requires.clone() }
		fn on_loaded( &self, handle: PluginHandle ) {
			*self.handle.lock().unwrap() = Some( handle );
			if self.destroy_on_load { self.destroy(); }
		}
	}

	/// Loads `*.toml` manifests and records every file it is asked to load.
	#[derive( Clone, Default )]
	pub struct FixtureBackend {
		attempts: Arc<Mutex<Vec<String>>>,
	}

	impl FixtureBackend {
		/// File stems of every `try_load` call so far, in call order.
		pub fn attempts( &self ) -> Vec<String> {
			self.attempts.lock().unwrap().clone()
		}
		pub fn attempts_of( &self, name: &str ) -> usize {
			self.attempts().iter().filter(| attempt | *attempt == name ).count()
		}
	}

	impl LoaderBackend for FixtureBackend {

		fn accepts( &self, path: &Path ) -> bool {
			path.extension().is_some_and(| ext | ext == MANIFEST_EXTENSION )
		}

		fn try_load( &mut self, path: &Path ) -> Result<Loaded, BackendError> {

			let name = stem( path );
			self.attempts.lock().unwrap().push( name.clone() );

			let manifest: PluginManifestData = toml::from_str( &std::fs::read_to_string( path ).map_err( FixtureError::Io )?)
				.map_err( FixtureError::Toml )?;
			if manifest.broken { return Err( FixtureError::Broken.into() ) }

			let iid = manifest.iid.clone()
				.or_else(|| manifest.provides.first().cloned())
				.unwrap_or_else(|| format!( "fixture:{}/none", name ));

			Ok( Loaded::new( FixturePlugin {
				name,
				provides: manifest.provides.into_iter().map( InterfaceId::from ).collect(),
				requires: manifest.requires.into_iter().map( InterfaceId::from ).collect(),
				destroy_on_load: manifest.destroy_on_load,
				handle: Mutex::new( None ),
			}, iid ))

		}

	}

	pub struct PluginDir {
		dir: tempfile::TempDir,
	}

	impl PluginDir {

		pub fn new() -> Self {
			Self { dir: tempfile::tempdir().expect( "Failed to create plugin directory" )}
		}

		/// A plugin directory inside the working directory, so its files can also
		/// be reached through a relative path.
		pub fn in_working_dir() -> Self {
			Self { dir: tempfile::Builder::new()
				.prefix( "plugins-" )
				.tempdir_in( "." )
				.expect( "Failed to create plugin directory" )}
		}

		pub fn path( &self ) -> &Path { self.dir.path() }

		/// Writes `<name>.toml` and returns its path.
		pub fn add( &self, name: &str, manifest: &str ) -> PathBuf {
			let path = self.file( name );
			std::fs::write( &path, manifest ).expect( "Failed to write manifest" );
			path
		}

		pub fn file( &self, name: &str ) -> PathBuf {
			self.dir.path().join( format!( "{}.{}", name, MANIFEST_EXTENSION ))
		}

		/// `<name>.toml` relative to the working directory. Only for directories
		/// created with [`in_working_dir`]( Self::in_working_dir ).
		pub fn relative_file( &self, name: &str ) -> PathBuf {
			let cwd = std::env::current_dir().expect( "No working directory" );
			self.file( name ).strip_prefix( &cwd ).expect( "Plugin directory outside the working directory" ).to_path_buf()
		}

		/// A manager over this directory, plus the backend it loads with.
		pub fn manager( &self ) -> ( PluginManager, FixtureBackend ) {
			let backend = FixtureBackend::default();
			let manager = PluginManager::new( backend.clone() );
			manager.set_plugins_dir( self.path() );
			( manager, backend )
		}

	}

	pub fn stem( path: &Path ) -> String {
		path.file_stem().and_then(| stem | stem.to_str()).unwrap_or_default().to_string()
	}

	/// Fixture name of a plugin object, or an empty string for foreign objects.
	pub fn name_of( object: &Arc<dyn PluginObject> ) -> String {
		Arc::clone( object ).into_any()
			.downcast::<FixturePlugin>()
			.map(| plugin | plugin.name.clone())
			.unwrap_or_default()
	}

	/// Names of the plugins `ids` refer to.
	pub fn names( manager: &PluginManager, ids: &[plugin_dock::PluginId] ) -> Vec<String> {
		ids.iter()
			.map(| id | manager.plugin_info( *id ).map(| info | stem( info.path() )).unwrap_or_default())
			.collect()
	}

	/// Records every event as `loaded:<name>`, `removed:<name>` or
	/// `batch:<loaded>/<failed>`.
	pub fn record_events( manager: &PluginManager ) -> Arc<Mutex<Vec<String>>> {
		let events = Arc::new( Mutex::new( Vec::new() ));
		let sink = Arc::clone( &events );
		manager.subscribe( move | event | sink.lock().unwrap().push( match event {
			PluginEvent::Loaded { object, .. } => format!( "loaded:{}", name_of( object )),
			PluginEvent::Removed { object, .. } => format!( "removed:{}", name_of( object )),
			PluginEvent::BatchFinished { loaded, failed } => format!( "batch:{}/{}", loaded, failed ),
		}));
		events
	}

}
