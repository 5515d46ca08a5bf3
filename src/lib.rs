//! A dependency-aware plugin manager.
//!
//! Plugins are files in a plugin directory. A [`LoaderBackend`] turns each file into
//! a [`PluginObject`], which declares the interfaces it **provides** and the ones it
//! **requires**. `plugin_dock` loads every file whose requirements are met, registers
//! what it provides and keeps going until nothing more can load, so files may sit on
//! disk in any order relative to their dependencies.
//!
//! # Core Concepts
//!
//! - [`InterfaceId`]: The name of a capability contract, e.g. `"my:package/greeter"`.
//! 	Interfaces only exist as names plugins agree on.
//!
//! - [`PluginObject`]: A loaded unit of functionality. Reports its provided and
//! 	required interfaces once, when the manager decides whether it can load.
//!
//! - [`InterfaceRegistry`]: Maps every interface to the plugins providing it, in
//! 	load order. A required interface counts as satisfied once it has any provider.
//!
//! - [`PluginManager`]: Owns the registry, the loaded plugins and the list of
//! 	[`CandidateFile`]s, runs the scheduler and notifies observers through
//! 	[`PluginEvent`]s.
//!
//! - [`LoaderBackend`]: Whatever turns a file into a plugin object. [`WasmLoader`]
//! 	loads WebAssembly components and reads both interface sets from the
//! 	component's imports and exports.
//!
//! # Failures
//!
//! Failures are per file. A file whose backend call fails, whose interface id
//! doesn't match the requested one, or whose requirements can never be satisfied is
//! **locked**: it is reported once as a [`LoadError`] and skipped by every later
//! batch. A failing file never aborts a batch, which is why
//! [`PluginManager::load_plugins`] returns a [`PartialSuccess`].
//!
//! # Re-exports
//!
//! `plugin_dock` re-exports `Engine` and `Component` from `wasmtime` for use with
//! [`WasmLoader`]. See the [wasmtime docs](https://docs.rs/wasmtime/latest/wasmtime/)
//! for details.
//!
//! # Example
//!
//! ```
//! use std::path::Path ;
//! use plugin_dock::{ BackendError, InterfaceId, Loaded, LoaderBackend, PluginManager, PluginObject };
//!
//! // A plugin whose interface sets come from a tiny text manifest:
//! // `provides` on the first line, `requires` on the second.
//! struct Manifest { provides: Vec<InterfaceId>, requires: Vec<InterfaceId> }
//!
//! impl PluginObject for Manifest {
//! 	fn provides( &self ) -> Vec<InterfaceId> { self.provides.clone() }
//! 	fn required_interfaces( &self ) -> Vec<InterfaceId> { self.requires.clone() }
//! }
//!
//! struct ManifestBackend ;
//!
//! impl LoaderBackend for ManifestBackend {
//! 	fn accepts( &self, path: &Path ) -> bool {
//! 		path.extension().is_some_and(| ext | ext == "plugin" )
//! 	}
//! 	fn try_load( &mut self, path: &Path ) -> Result<Loaded, BackendError> {
//! 		let contents = std::fs::read_to_string( path )?;
//! 		let mut lines = contents.lines().map(| line | {
//! 			line.split_whitespace().map( InterfaceId::from ).collect::<Vec<_>>()
//! 		});
//! 		let provides = lines.next().unwrap_or_default();
//! 		let requires = lines.next().unwrap_or_default();
//! 		let iid = provides.first().cloned().ok_or( "plugin provides nothing" )?;
//! 		Ok( Loaded::new( Manifest { provides, requires }, iid ))
//! 	}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! // `a` sorts first but depends on `b`; the scheduler sorts that out.
//! std::fs::write( dir.path().join( "a.plugin" ), "demo:app/main\ndemo:log/sink\n" )?;
//! std::fs::write( dir.path().join( "b.plugin" ), "demo:log/sink\n" )?;
//!
//! let manager = PluginManager::new( ManifestBackend );
//! manager.set_plugins_dir( dir.path() );
//!
//! let ( loaded, failures ) = manager.load_plugins()?;
//! assert_eq!( loaded.len(), 2 );
//! assert!( failures.is_empty() );
//!
//! let app = manager.interface_object( "demo:app/main" ).expect( "app is loaded" );
//! let app = manager.plugin_id( &app ).expect( "app is registered" );
//! let sink = manager.interface_object( "demo:log/sink" ).expect( "sink is loaded" );
//! assert_eq!( manager.depend_plugins( app ), vec![ manager.plugin_id( &sink ).expect( "sink is registered" )]);
//! # Ok(())
//! # }
//! ```
//!
//! # Observing Changes
//!
//! Observers are called synchronously after the change is visible through queries,
//! with no internal lock held.
//!
//! ```
//! # use std::path::Path ;
//! # use std::sync::{ Arc, Mutex };
//! # use plugin_dock::{ BackendError, InterfaceId, Loaded, LoaderBackend, PluginEvent, PluginManager, PluginObject };
//! # struct Unit ;
//! # impl PluginObject for Unit {
//! # 	fn provides( &self ) -> Vec<InterfaceId> { vec![ "demo:unit/api".into() ]}
//! # 	fn required_interfaces( &self ) -> Vec<InterfaceId> { Vec::new() }
//! # }
//! # struct Backend ;
//! # impl LoaderBackend for Backend {
//! # 	fn try_load( &mut self, _: &Path ) -> Result<Loaded, BackendError> { Ok( Loaded::new( Unit, "demo:unit/api" ))}
//! # }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = PluginManager::new( Backend );
//! let seen = Arc::new( Mutex::new( Vec::new() ));
//!
//! let sink = Arc::clone( &seen );
//! manager.subscribe( move | event | match event {
//! 	PluginEvent::Loaded { id, .. } => sink.lock().unwrap().push( format!( "loaded {id}" )),
//! 	PluginEvent::Removed { id, .. } => sink.lock().unwrap().push( format!( "removed {id}" )),
//! 	PluginEvent::BatchFinished { .. } => {},
//! });
//!
//! let id = manager.load_plugin( "unit.plugin", None )?;
//! manager.unload_plugin( id );
//! assert_eq!( *seen.lock().unwrap(), vec![ format!( "loaded {id}" ), format!( "removed {id}" )]);
//! # Ok(())
//! # }
//! ```

mod interface ;
mod plugin ;
mod registry ;
mod dependency ;
mod backend ;
mod settings ;
mod candidate ;
mod events ;
mod loading ;
mod manager ;
mod config ;
mod wasm ;
mod utils ;
pub mod global ;

#[doc( no_inline )]
pub use wasmtime::Engine ;
#[doc( no_inline )]
pub use wasmtime::component::Component ;

pub use interface::InterfaceId ;
pub use plugin::{ AsAny, LoadedPlugin, PluginHandle, PluginId, PluginObject };
pub use registry::InterfaceRegistry ;
pub use backend::{ BackendError, Loaded, LoaderBackend };
pub use settings::{ MemorySettings, SettingsStore };
pub use candidate::{ CandidateFile, CandidateState };
pub use events::{ PluginEvent, SubscriptionId };
pub use loading::LoadError ;
pub use manager::{ ManagerError, PluginManager };
pub use config::{ ConfigError, ManagerConfig, PLUGINS_DIR_NAME, default_plugins_dir };
pub use wasm::{ WASM_EXTENSIONS, WasmLoadError, WasmLoader, WasmPlugin };
pub use utils::PartialSuccess ;
