//! The seam between the manager and whatever turns a file into a plugin object.

use std::path::Path ;
use std::sync::Arc ;

use crate::{ InterfaceId, PluginObject };



/// Error type backends report failures with.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static> ;

/// A plugin object freshly produced by a backend, not yet registered.
pub struct Loaded {
	/// The instantiated plugin.
	pub object: Arc<dyn PluginObject>,
	/// The interface id the file declares itself as implementing. Compared against
	/// the optional filter of [`PluginManager::load_plugin`]( crate::PluginManager::load_plugin )
	/// and [`PluginManager::next_load_plugins`]( crate::PluginManager::next_load_plugins ).
	pub iid: InterfaceId,
}

impl Loaded {
	/// Bundles an object with its declared interface id.
	pub fn new( object: impl PluginObject, iid: impl Into<InterfaceId> ) -> Self {
		Self { object: Arc::new( object ), iid: iid.into() }
	}
}

impl std::fmt::Debug for Loaded {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "Loaded" )
			.field( "object", &"<PluginObject>" )
			.field( "iid", &self.iid )
			.finish()
	}
}

/// Reads a file off disk and produces a plugin object.
///
/// Any failure is terminal for that file: the manager locks the candidate and
/// never calls the backend for it again during scheduling. Backends are only ever
/// called by one scheduling operation at a time.
pub trait LoaderBackend: Send {

	/// Whether `path` looks like something this backend can load. Files rejected
	/// here are not tracked as candidates at all.
	fn accepts( &self, _path: &Path ) -> bool { true }

	/// Loads the file at `path`.
	///
	/// # Errors
	/// Returns an error if the file can't be read, parsed or instantiated.
	fn try_load( &mut self, path: &Path ) -> Result<Loaded, BackendError> ;

}

impl<B: LoaderBackend + ?Sized> LoaderBackend for Box<B> {
	fn accepts( &self, path: &Path ) -> bool { ( **self ).accepts( path )}
	fn try_load( &mut self, path: &Path ) -> Result<Loaded, BackendError> { ( **self ).try_load( path )}
}
