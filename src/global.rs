//! The process-wide manager.
//!
//! Libraries and tests should pass [`PluginManager`] handles around explicitly;
//! this module only serves the application edge, where a single instance is
//! reachable from anywhere.

use std::sync::OnceLock ;

use crate::{ ManagerError, PluginId, PluginManager, WasmLoader };



static INSTANCE: OnceLock<PluginManager> = OnceLock::new();

/// Installs `manager` as the process-wide instance.
///
/// # Errors
/// Gives `manager` back if an instance already exists.
pub fn install( manager: PluginManager ) -> Result<&'static PluginManager, PluginManager> {
	INSTANCE.set( manager ).map(|()| instance())
}

/// The process-wide instance, created on first access with a [`WasmLoader`] and
/// the default plugin directory unless one was [`install`]ed first.
pub fn instance() -> &'static PluginManager {
	INSTANCE.get_or_init(|| PluginManager::new( WasmLoader::default() ))
}

/// Unloads every plugin of the process-wide instance, dependents first.
///
/// Does nothing if no instance was ever created.
///
/// # Errors
/// [`ManagerError::LoadInProgress`] when called from an observer of a load
/// operation on the same thread.
pub fn shutdown() -> Result<Vec<PluginId>, ManagerError> {
	match INSTANCE.get() {
		Some( manager ) => manager.unload_all(),
		None => Ok( Vec::new() ),
	}
}
