//! The plugin manager.
//!
//! [`PluginManager`] ties the pieces together: it owns the candidate list, the
//! [`InterfaceRegistry`] and the loaded plugins, drives the load scheduler through
//! its [`LoaderBackend`] and tells observers what happened.

use std::collections::BTreeMap ;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use std::thread::ThreadId ;
use thiserror::Error ;

use crate::candidate::{ self, CandidateFile, CandidateState };
use crate::config::ManagerConfig ;
use crate::dependency ;
use crate::events::{ Notifier, PluginEvent, SubscriptionId };
use crate::loading::{ Attempt, LoadError };
use crate::settings::{ MemorySettings, SettingsStore };
use crate::utils::PartialSuccess ;
use crate::plugin::AsAny ;
use crate::{ InterfaceId, InterfaceRegistry, LoadedPlugin, LoaderBackend, PluginId, PluginObject };



/// Errors that prevent a manager operation from running at all.
#[derive( Debug, Error )]
pub enum ManagerError {
	/// A load operation was started from inside an observer callback of another
	/// load operation on the same thread.
	#[error( "A load operation is already in progress on this thread" )] LoadInProgress,
	/// The requested file did not load.
	#[error( transparent )] Load( #[from] LoadError ),
}

/// Everything that changes together when a plugin is loaded or unloaded.
pub(crate) struct State {
	pub(crate) registry: InterfaceRegistry,
	pub(crate) plugins: BTreeMap<PluginId, LoadedPlugin>,
	pub(crate) candidates: Vec<CandidateFile>,
	pub(crate) plugins_dir: PathBuf,
	pub(crate) settings: Option<Arc<dyn SettingsStore>>,
	next_id: u64,
}

impl State {
	pub(crate) fn next_plugin_id( &mut self ) -> PluginId {
		self.next_id += 1 ;
		PluginId::new( self.next_id )
	}
}

pub(crate) struct Shared {
	pub(crate) state: Mutex<State>,
	/// Holding the backend is the exclusive right to run the scheduler.
	backend: Mutex<Box<dyn LoaderBackend>>,
	batch_owner: Mutex<Option<ThreadId>>,
	pub(crate) notifier: Notifier,
}

/// Exclusive access to the backend for the duration of one load operation.
struct Batch<'a> {
	owner: &'a Mutex<Option<ThreadId>>,
	backend: MutexGuard<'a, Box<dyn LoaderBackend>>,
}

impl Drop for Batch<'_> {
	fn drop( &mut self ) {
		*self.owner.lock().unwrap_or_else( PoisonError::into_inner ) = None ;
	}
}

impl Shared {

	pub(crate) fn state( &self ) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else( PoisonError::into_inner )
	}

	pub(crate) fn settings( &self ) -> Option<Arc<dyn SettingsStore>> {
		self.state().settings.clone()
	}

	/// Serializes load operations across threads and rejects re-entry from the
	/// thread that is already loading.
	fn begin_batch( &self ) -> Result<Batch<'_>, ManagerError> {
		let current = std::thread::current().id();
		if *self.batch_owner.lock().unwrap_or_else( PoisonError::into_inner ) == Some( current ) {
			return Err( ManagerError::LoadInProgress );
		}
		let backend = self.backend.lock().unwrap_or_else( PoisonError::into_inner );
		*self.batch_owner.lock().unwrap_or_else( PoisonError::into_inner ) = Some( current );
		Ok( Batch { owner: &self.batch_owner, backend })
	}

	/// Unregisters a plugin and drops its record, then emits
	/// [`Removed`]( PluginEvent::Removed ). Returns `false` if it wasn't loaded.
	pub(crate) fn remove_plugin( &self, id: PluginId ) -> bool {

		let removed = {
			let mut state = self.state();
			let Some( removed ) = state.plugins.remove( &id ) else { return false };
			state.registry.unregister( id );
			if let Some( candidate ) = state.candidates.iter_mut().find(| c | c.state == CandidateState::Loaded( id )) {
				candidate.state = CandidateState::Released ;
			}
			removed
		};

		tracing::info!( plugin = %id, path = %removed.path.display(), "Plugin removed" );
		self.notifier.emit( &PluginEvent::Removed { id, object: removed.object });
		true

	}

}

/// Discovers, loads and tracks plugins.
///
/// A `PluginManager` is a cheap handle: clones refer to the same manager. It is
/// `Send + Sync`; load operations from different threads run one after another,
/// while queries can run at any time and always see a consistent state.
///
/// # Example
///
/// ```
/// use std::path::Path ;
/// use plugin_dock::{ BackendError, InterfaceId, Loaded, LoaderBackend, PluginManager, PluginObject };
///
/// struct Logger ;
/// impl PluginObject for Logger {
/// 	fn provides( &self ) -> Vec<InterfaceId> { vec![ "demo:log/sink".into() ]}
/// 	fn required_interfaces( &self ) -> Vec<InterfaceId> { Vec::new() }
/// }
///
/// struct Backend ;
/// impl LoaderBackend for Backend {
/// 	fn try_load( &mut self, _path: &Path ) -> Result<Loaded, BackendError> {
/// 		Ok( Loaded::new( Logger, "demo:log/sink" ))
/// 	}
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = PluginManager::new( Backend );
/// let id = manager.load_plugin( "logger.plugin", None )?;
///
/// assert_eq!( manager.interface_objects( "demo:log/sink" ).len(), 1 );
/// assert!( manager.interface_object_as::<Logger>( "demo:log/sink" ).is_some() );
/// assert!( manager.unload_plugin( id ));
/// # Ok(())
/// # }
/// ```
#[derive( Clone )]
pub struct PluginManager {
	shared: Arc<Shared>,
}

impl PluginManager {

	/// Creates a manager using `backend` to load files, looking for plugins in
	/// [`default_plugins_dir`]( crate::default_plugins_dir ).
	pub fn new( backend: impl LoaderBackend + 'static ) -> Self {
		Self { shared: Arc::new( Shared {
			state: Mutex::new( State {
				registry: InterfaceRegistry::default(),
				plugins: BTreeMap::new(),
				candidates: Vec::new(),
				plugins_dir: crate::config::default_plugins_dir(),
				settings: None,
				next_id: 0,
			}),
			backend: Mutex::new( Box::new( backend )),
			batch_owner: Mutex::new( None ),
			notifier: Notifier::default(),
		})}
	}

	/// Applies a configuration: the plugin directory, and a [`MemorySettings`]
	/// store seeded from `config.settings` when that table is non-empty.
	pub fn configure( &self, config: &ManagerConfig ) {
		let mut state = self.shared.state();
		state.plugins_dir = config.resolved_plugins_dir();
		if !config.settings.is_empty() {
			state.settings = Some( Arc::new( MemorySettings::from( config.settings.clone() )));
		}
	}

	/// Directory scanned by [`load_plugins`]( Self::load_plugins ).
	pub fn plugins_dir( &self ) -> PathBuf {
		self.shared.state().plugins_dir.clone()
	}

	/// Changes the directory scanned by the next [`load_plugins`]( Self::load_plugins ).
	/// Candidates already discovered stay tracked.
	pub fn set_plugins_dir( &self, dir: impl Into<PathBuf> ) {
		self.shared.state().plugins_dir = dir.into();
	}

	/// The settings store forwarded to plugins.
	pub fn settings( &self ) -> Option<Arc<dyn SettingsStore>> {
		self.shared.settings()
	}

	/// Replaces the settings store forwarded to plugins.
	pub fn set_settings( &self, settings: Arc<dyn SettingsStore> ) {
		self.shared.state().settings = Some( settings );
	}

	/// Registers an observer for [`PluginEvent`]s.
	pub fn subscribe( &self, observer: impl Fn( &PluginEvent ) + Send + Sync + 'static ) -> SubscriptionId {
		self.shared.notifier.subscribe( observer )
	}

	/// Removes an observer. Returns `false` if it was not subscribed.
	pub fn unsubscribe( &self, subscription: SubscriptionId ) -> bool {
		self.shared.notifier.unsubscribe( subscription )
	}

	/// Discovers plugins in the plugin directory and loads as many as possible.
	///
	/// Passes over the candidates repeat until one loads nothing new, so plugins
	/// may appear on disk in any order relative to their dependencies. Whatever is
	/// still waiting afterwards is locked and reported.
	/// [`BatchFinished`]( PluginEvent::BatchFinished ) is emitted exactly once, after
	/// the last pass.
	///
	/// # Partial Success
	/// Returns the plugins loaded by this call alongside one error per file that
	/// did not load, including files locked by earlier calls. Everything loaded
	/// stays registered regardless of failures. All files loaded iff the error list
	/// is empty.
	///
	/// # Errors
	/// [`ManagerError::LoadInProgress`] when called from an observer of another
	/// load operation on the same thread.
	pub fn load_plugins( &self ) -> Result<PartialSuccess<Vec<PluginId>, LoadError>, ManagerError> {
		let mut batch = self.shared.begin_batch()?;
		Ok( self.shared.run_to_fixpoint( &mut **batch.backend ))
	}

	/// Picks up new files in the plugin directory, then runs a single pass over the
	/// candidates.
	///
	/// When `filter` is given, files declaring a different interface id are locked.
	/// Progress was made iff the returned id list is non-empty. Candidates that are
	/// merely waiting on a dependency stay schedulable, and no
	/// [`BatchFinished`]( PluginEvent::BatchFinished ) is emitted.
	///
	/// # Errors
	/// [`ManagerError::LoadInProgress`] when called from an observer of another
	/// load operation on the same thread.
	pub fn next_load_plugins( &self, filter: Option<&InterfaceId> ) -> Result<PartialSuccess<Vec<PluginId>, LoadError>, ManagerError> {
		let mut batch = self.shared.begin_batch()?;
		Ok( self.shared.run_single_pass( &mut **batch.backend, filter ))
	}

	/// Loads exactly one file, outside the fixpoint.
	///
	/// The file is tracked as a candidate if it wasn't already. A file that is
	/// already loaded returns its existing id. Backend failures and interface
	/// mismatches lock the candidate; missing dependencies leave it waiting for a
	/// later pass without retrying here. A plugin that destroys itself from
	/// [`on_loaded`]( PluginObject::on_loaded ) still returns its id, with the
	/// matching [`Removed`]( PluginEvent::Removed ) already emitted.
	///
	/// # Errors
	/// - [`ManagerError::Load`] with the reason the file did not load
	/// - [`ManagerError::LoadInProgress`] when called from an observer of another
	/// 	load operation on the same thread
	pub fn load_plugin( &self, path: impl AsRef<Path>, iid: Option<&InterfaceId> ) -> Result<PluginId, ManagerError> {

		let path = candidate::normalize( path );
		let path = path.as_path();
		let mut batch = self.shared.begin_batch()?;

		{
			let mut state = self.shared.state();
			let existing = state.candidates.iter()
				.find(| candidate | candidate.path == path )
				.map(| candidate | candidate.state.clone());
			match existing {
				Some( CandidateState::Loaded( id )) => return Ok( id ),
				Some( _ ) => {},
				None => state.candidates.push( CandidateFile::new( path.to_path_buf() )),
			}
		}

		match self.shared.attempt( &mut **batch.backend, path, iid ) {
			Attempt::Loaded( id ) => Ok( id ),
			Attempt::Deferred( missing ) => Err( LoadError::UnsatisfiedDependencies { path: path.to_path_buf(), missing }.into() ),
			Attempt::Failed( err ) => Err( err.into() ),
		}

	}

	/// Unloads one plugin. Plugins depending on it stay loaded and simply lose it
	/// as a provider. Returns `false` if it wasn't loaded.
	pub fn unload_plugin( &self, id: PluginId ) -> bool {
		self.shared.remove_plugin( id )
	}

	/// Unloads every plugin, dependents before the plugins they depend on.
	///
	/// Returns the order plugins were removed in.
	///
	/// # Errors
	/// [`ManagerError::LoadInProgress`] when called from an observer of a load
	/// operation on the same thread.
	pub fn unload_all( &self ) -> Result<Vec<PluginId>, ManagerError> {
		let _batch = self.shared.begin_batch()?;
		let order = {
			let state = self.shared.state();
			dependency::teardown_order( &state.registry, &state.plugins )
		};
		Ok( order.into_iter().filter(| id | self.shared.remove_plugin( *id )).collect() )
	}

	/// The first-loaded provider of `iid`.
	pub fn interface_object( &self, iid: impl AsRef<str> ) -> Option<Arc<dyn PluginObject>> {
		let state = self.shared.state();
		state.registry.lookup_one( iid.as_ref() )
			.and_then(| id | state.plugins.get( &id ))
			.map(| plugin | Arc::clone( &plugin.object ))
	}

	/// The first-loaded provider of `iid`, if it is a `T`.
	pub fn interface_object_as<T: PluginObject>( &self, iid: impl AsRef<str> ) -> Option<Arc<T>> {
		self.interface_object( iid )?.into_any().downcast::<T>().ok()
	}

	/// All providers of `iid` in load order.
	pub fn interface_objects( &self, iid: impl AsRef<str> ) -> Vec<Arc<dyn PluginObject>> {
		let state = self.shared.state();
		state.registry.lookup_all( iid.as_ref() ).into_iter()
			.filter_map(| id | state.plugins.get( &id ))
			.map(| plugin | Arc::clone( &plugin.object ))
			.collect()
	}

	/// All providers of `iid` that are a `T`, in load order.
	pub fn interface_objects_as<T: PluginObject>( &self, iid: impl AsRef<str> ) -> Vec<Arc<T>> {
		self.interface_objects( iid ).into_iter()
			.filter_map(| object | object.into_any().downcast::<T>().ok())
			.collect()
	}

	/// Plugins `plugin` directly depends on, in load order.
	pub fn depend_plugins( &self, plugin: PluginId ) -> Vec<PluginId> {
		let state = self.shared.state();
		dependency::depend_plugins( &state.registry, &state.plugins, plugin )
	}

	/// Plugins that directly depend on `plugin`, in load order.
	pub fn dependent_plugins( &self, plugin: PluginId ) -> Vec<PluginId> {
		let state = self.shared.state();
		dependency::dependent_plugins( &state.registry, &state.plugins, plugin )
	}

	/// The object of a loaded plugin.
	pub fn plugin( &self, id: PluginId ) -> Option<Arc<dyn PluginObject>> {
		self.shared.state().plugins.get( &id ).map(| plugin | Arc::clone( &plugin.object ))
	}

	/// Everything the manager knows about a loaded plugin.
	pub fn plugin_info( &self, id: PluginId ) -> Option<LoadedPlugin> {
		self.shared.state().plugins.get( &id ).cloned()
	}

	/// Id of the loaded plugin backed by `object`.
	pub fn plugin_id( &self, object: &Arc<dyn PluginObject> ) -> Option<PluginId> {
		self.shared.state().plugins.values()
			.find(| plugin | Arc::ptr_eq( &plugin.object, object ))
			.map( LoadedPlugin::id )
	}

	/// Every loaded plugin, in load order.
	pub fn plugins( &self ) -> Vec<PluginId> {
		self.shared.state().plugins.keys().copied().collect()
	}

	/// Every tracked file and its scheduling state, in discovery order.
	pub fn candidates( &self ) -> Vec<CandidateFile> {
		self.shared.state().candidates.clone()
	}

}

impl std::fmt::Debug for PluginManager {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let state = self.shared.state();
		f.debug_struct( "PluginManager" )
			.field( "plugins_dir", &state.plugins_dir )
			.field( "plugins", &state.plugins.len() )
			.field( "candidates", &state.candidates.len() )
			.field( "interfaces", &state.registry.len() )
			.finish_non_exhaustive()
	}
}
