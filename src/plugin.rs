//! Plugin objects and their bookkeeping.
//!
//! A plugin is whatever a [`LoaderBackend`]( crate::LoaderBackend ) produces from a
//! file on disk. It **provides** zero or more interfaces (what it exports to other
//! plugins) and **requires** zero or more interfaces (what it expects to find in the
//! registry before it can be loaded).

use std::any::Any ;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Weak };

use crate::InterfaceId ;
use crate::manager::Shared ;
use crate::settings::SettingsStore ;



/// Identifier the manager assigns to a plugin once its load is finalized.
///
/// Ids increase monotonically, so ordering by id is ordering by load time.
#[derive( Copy, Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd )]
pub struct PluginId( u64 );

impl PluginId {
	/// Wraps a raw id. The manager assigns ids itself; this is for working with a
	/// standalone [`InterfaceRegistry`]( crate::InterfaceRegistry ).
	pub const fn new( id: u64 ) -> Self { Self( id )}
}

impl std::fmt::Display for PluginId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> Result<(), std::fmt::Error> {
		write!( f, "#{}", self.0 )
	}
}

impl From<PluginId> for u64 {
	fn from( id: PluginId ) -> Self { id.0 }
}

/// Lets a shared plugin object be recovered as its concrete type.
///
/// Blanket-implemented for every eligible type; never implement it by hand.
pub trait AsAny: Any + Send + Sync {
	/// Converts the shared handle into one that can be downcast.
	fn into_any( self: Arc<Self> ) -> Arc<dyn Any + Send + Sync> ;
}

impl<T: Any + Send + Sync> AsAny for T {
	fn into_any( self: Arc<Self> ) -> Arc<dyn Any + Send + Sync> { self }
}

/// A loaded unit of functionality.
///
/// Implementations are usually produced by a [`LoaderBackend`]( crate::LoaderBackend ).
/// Both interface sets are read exactly once, when the manager decides whether the
/// object can be loaded; later changes are not observed.
///
/// # Example
///
/// ```
/// use plugin_dock::{ InterfaceId, PluginObject };
///
/// struct Greeter ;
///
/// impl PluginObject for Greeter {
/// 	fn provides( &self ) -> Vec<InterfaceId> { vec![ "demo:greeter/api".into() ]}
/// 	fn required_interfaces( &self ) -> Vec<InterfaceId> { vec![ "demo:log/sink".into() ]}
/// }
/// ```
pub trait PluginObject: AsAny {

	/// Interfaces this plugin makes available to others.
	fn provides( &self ) -> Vec<InterfaceId> ;

	/// Interfaces that must have at least one provider before this plugin can load.
	fn required_interfaces( &self ) -> Vec<InterfaceId> ;

	/// Called once after the plugin has been registered and the
	/// [`Loaded`]( crate::PluginEvent::Loaded ) notification has gone out, so a
	/// plugin destroying itself from here is reported as removed after it was
	/// reported as loaded.
	///
	/// The handle is the plugin's way back into the manager: it gives access to the
	/// settings store and lets whoever tears the plugin down report it through
	/// [`PluginHandle::destroyed`].
	fn on_loaded( &self, _handle: PluginHandle ) {}

}

/// A plugin the manager has finished loading.
///
/// Snapshot returned by [`PluginManager::plugin_info`]( crate::PluginManager::plugin_info ).
#[derive( Clone )]
pub struct LoadedPlugin {
	pub(crate) id: PluginId,
	pub(crate) path: PathBuf,
	pub(crate) iid: InterfaceId,
	pub(crate) object: Arc<dyn PluginObject>,
	pub(crate) provided: Vec<InterfaceId>,
	pub(crate) required: Vec<InterfaceId>,
}

impl LoadedPlugin {
	/// Id assigned at load time.
	#[inline] pub fn id( &self ) -> PluginId { self.id }
	/// File the plugin was loaded from.
	#[inline] pub fn path( &self ) -> &Path { &self.path }
	/// Interface id the backend declared for the file.
	#[inline] pub fn iid( &self ) -> &InterfaceId { &self.iid }
	/// The plugin object itself.
	#[inline] pub fn object( &self ) -> &Arc<dyn PluginObject> { &self.object }
	/// Interfaces registered for this plugin.
	#[inline] pub fn provided( &self ) -> &[InterfaceId] { &self.provided }
	/// Interfaces this plugin required at load time.
	#[inline] pub fn required( &self ) -> &[InterfaceId] { &self.required }
}

impl std::fmt::Debug for LoadedPlugin {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "LoadedPlugin" )
			.field( "id", &self.id )
			.field( "path", &self.path )
			.field( "iid", &self.iid )
			.field( "object", &"<PluginObject>" )
			.field( "provided", &self.provided )
			.field( "required", &self.required )
			.finish()
	}
}

/// Handle given to every plugin in [`PluginObject::on_loaded`].
///
/// Only holds a weak reference to the manager, so a plugin keeping its handle
/// does not keep the manager alive.
#[derive( Clone )]
pub struct PluginHandle {
	pub(crate) id: PluginId,
	pub(crate) manager: Weak<Shared>,
}

impl PluginHandle {

	/// Id of the plugin this handle belongs to.
	#[inline] pub fn id( &self ) -> PluginId { self.id }

	/// The settings store currently configured on the manager.
	pub fn settings( &self ) -> Option<Arc<dyn SettingsStore>> {
		self.manager.upgrade()?.settings()
	}

	/// Reports that the plugin's backing object has been destroyed.
	///
	/// The plugin is unregistered from every interface and dropped from the loaded
	/// set before [`Removed`]( crate::PluginEvent::Removed ) is emitted. Returns
	/// `false` if the plugin was already gone or the manager no longer exists.
	pub fn destroyed( &self ) -> bool {
		self.manager.upgrade().is_some_and(| shared | Shared::remove_plugin( &shared, self.id ))
	}

}

impl std::fmt::Debug for PluginHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginHandle" )
			.field( "id", &self.id )
			.field( "manager_alive", &( self.manager.strong_count() > 0 ))
			.finish()
	}
}
