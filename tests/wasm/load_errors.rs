use plugin_dock::{ LoadError, PluginManager, WasmLoadError, WasmLoader };

#[test]
fn wasm_component_without_exports() {

	let dir = tempfile::tempdir().expect( "Failed to create plugin directory" );
	std::fs::write( dir.path().join( "empty.wat" ), "(component)" ).expect( "Failed to write component" );

	let manager = PluginManager::new( WasmLoader::default() );
	manager.set_plugins_dir( dir.path() );

	let ( loaded, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert!( loaded.is_empty() );
	match failures.as_slice() {
		[ LoadError::Backend { source, .. }] => assert!( matches!(
			source.downcast_ref::<WasmLoadError>(),
			Some( WasmLoadError::NoExports ),
		)),
		other => panic!( "Expected a single Backend failure, found: {:#?}", other ),
	}

}

#[test]
fn wasm_invalid_component() {

	let dir = tempfile::tempdir().expect( "Failed to create plugin directory" );
	std::fs::write( dir.path().join( "garbage.wasm" ), b"\0asm garbage" ).expect( "Failed to write file" );

	let manager = PluginManager::new( WasmLoader::default() );
	manager.set_plugins_dir( dir.path() );

	let ( _, failures ) = manager.load_plugins().expect( "Load rejected" );
	match failures.as_slice() {
		[ LoadError::Backend { source, .. }] => assert!( matches!(
			source.downcast_ref::<WasmLoadError>(),
			Some( WasmLoadError::Compile( _ )),
		)),
		other => panic!( "Expected a single Backend failure, found: {:#?}", other ),
	}
	assert!( manager.candidates()[0].is_locked() );

}
