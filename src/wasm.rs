//! A [`LoaderBackend`] for WebAssembly components.
//!
//! The component model makes a component's dependencies explicit: every imported
//! instance is an interface it requires and every exported instance is one it
//! provides. [`WasmLoader`] compiles a component and reads those two sets straight
//! from its type, so no separate manifest is needed.

use std::path::Path ;
use thiserror::Error ;
use wasmtime::Engine ;
use wasmtime::component::Component ;
use wasmtime::component::types::ComponentItem ;

use crate::{ BackendError, InterfaceId, Loaded, LoaderBackend, PluginObject };



/// File extensions [`WasmLoader`] picks up during discovery.
pub const WASM_EXTENSIONS: [&str; 2] = [ "wasm", "wat" ];

/// Errors specific to loading WebAssembly components.
#[derive( Debug, Error )]
pub enum WasmLoadError {
	/// wasmtime rejected the file.
	#[error( "Compilation failed: {0}" )] Compile( wasmtime::Error ),
	/// The component exports no instance, so it has no interface id.
	#[error( "Component exports no interfaces" )] NoExports,
}

/// Loads `.wasm` (and `.wat`) component files.
///
/// The declared interface id of a component is its first exported interface.
#[derive( Clone, Default )]
pub struct WasmLoader {
	engine: Engine,
}

impl WasmLoader {
	/// Creates a loader compiling with `engine`.
	pub fn new( engine: Engine ) -> Self { Self { engine }}

	/// The engine components are compiled with.
	#[inline] pub fn engine( &self ) -> &Engine { &self.engine }
}

impl std::fmt::Debug for WasmLoader {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmLoader" ).field( "engine", &"<Engine>" ).finish()
	}
}

impl LoaderBackend for WasmLoader {

	fn accepts( &self, path: &Path ) -> bool {
		path.extension()
			.and_then(| ext | ext.to_str())
			.is_some_and(| ext | WASM_EXTENSIONS.contains( &ext ))
	}

	fn try_load( &mut self, path: &Path ) -> Result<Loaded, BackendError> {
		let component = Component::from_file( &self.engine, path ).map_err( WasmLoadError::Compile )?;
		let plugin = WasmPlugin::new( &self.engine, component );
		let iid = plugin.exports.first().cloned().ok_or( WasmLoadError::NoExports )?;
		Ok( Loaded::new( plugin, iid ))
	}

}

/// A compiled component together with the interfaces it imports and exports.
#[derive( Clone )]
pub struct WasmPlugin {
	component: Component,
	imports: Vec<InterfaceId>,
	exports: Vec<InterfaceId>,
}

impl WasmPlugin {

	fn new( engine: &Engine, component: Component ) -> Self {
		let ty = component.component_type();
		let imports = ty.imports( engine )
			.filter(|( _, item )| matches!( item, ComponentItem::ComponentInstance( _ )))
			.map(|( name, _ )| InterfaceId::new( name ))
			.collect();
		let exports = ty.exports( engine )
			.filter(|( _, item )| matches!( item, ComponentItem::ComponentInstance( _ )))
			.map(|( name, _ )| InterfaceId::new( name ))
			.collect();
		Self { component, imports, exports }
	}

	/// The compiled component, ready to be instantiated.
	#[inline] pub fn component( &self ) -> &Component { &self.component }

}

impl std::fmt::Debug for WasmPlugin {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmPlugin" )
			.field( "component", &"<Component>" )
			.field( "imports", &self.imports )
			.field( "exports", &self.exports )
			.finish()
	}
}

impl PluginObject for WasmPlugin {
	fn provides( &self ) -> Vec<InterfaceId> { self.exports.clone() }
	fn required_interfaces( &self ) -> Vec<InterfaceId> { self.imports.clone() }
}
