use plugin_dock::CandidateState ;
use crate::plugin_fixtures::{ FixturePlugin, record_events };

#[test]
fn destruction_unregisters_plugin() {

	let dir = plugin_dir! {
		"a-app" => r#"
			provides = [ "demo:app/main" ]
			requires = [ "demo:log/sink" ]
		"#,
		"b-logger" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, _ ) = dir.manager();
	let ( _, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );

	let logger = manager.interface_object_as::<FixturePlugin>( "demo:log/sink" ).expect( "Logger missing" );
	let logger_id = logger.handle().expect( "Logger has no handle" ).id();
	let app_id = manager.plugins().into_iter().find(| id | *id != logger_id ).expect( "App missing" );
	assert_eq!( manager.depend_plugins( app_id ), vec![ logger_id ]);

	let events = record_events( &manager );
	assert!( logger.destroy() );

	assert!( manager.interface_object( "demo:log/sink" ).is_none() );
	assert!( manager.plugin( logger_id ).is_none() );
	assert!( manager.dependent_plugins( logger_id ).is_empty() );
	assert!( manager.depend_plugins( app_id ).is_empty() );
	assert_eq!( *events.lock().unwrap(), vec![ "removed:b-logger" ]);

	// The app stays loaded without its provider.
	assert!( manager.plugin( app_id ).is_some() );

}

#[test]
fn destruction_twice_is_noop() {

	let dir = plugin_dir! {
		"logger" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, _ ) = dir.manager();
	manager.load_plugin( dir.file( "logger" ), None ).expect( "Failed to load logger" );

	let logger = manager.interface_object_as::<FixturePlugin>( "demo:log/sink" ).expect( "Logger missing" );
	assert!( logger.destroy() );
	assert!( !logger.destroy() );

}

#[test]
fn destroyed_plugin_is_not_reloaded() {

	let dir = plugin_dir! {
		"logger" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, backend ) = dir.manager();
	let _ = manager.load_plugins().expect( "Load rejected" );

	let logger = manager.interface_object_as::<FixturePlugin>( "demo:log/sink" ).expect( "Logger missing" );
	logger.destroy();

	let ( loaded, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );
	assert!( loaded.is_empty() );
	assert_eq!( manager.candidates()[0].state(), &CandidateState::Released );
	assert_eq!( backend.attempts_of( "logger" ), 1 );

}

#[test]
fn destruction_after_manager_dropped() {

	let dir = plugin_dir! {
		"logger" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, _ ) = dir.manager();
	manager.load_plugin( dir.file( "logger" ), None ).expect( "Failed to load logger" );

	let logger = manager.interface_object_as::<FixturePlugin>( "demo:log/sink" ).expect( "Logger missing" );
	drop( manager );

	assert!( logger.handle().is_some_and(| handle | handle.settings().is_none() ));
	assert!( !logger.destroy() );

}

#[test]
fn destruction_keeps_other_providers() {

	let dir = plugin_dir! {
		"first" => r#"provides = [ "demo:log/sink" ]"#,
		"second" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, _ ) = dir.manager();
	let ( _, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );

	let providers = manager.interface_objects_as::<FixturePlugin>( "demo:log/sink" );
	assert_eq!( providers.iter().map(| p | p.name.as_str()).collect::<Vec<_>>(), vec![ "first", "second" ]);

	providers[0].destroy();
	let remaining = manager.interface_object_as::<FixturePlugin>( "demo:log/sink" ).expect( "No provider left" );
	assert_eq!( remaining.name, "second" );

}

#[test]
fn destruction_from_on_loaded_is_reported_after_loading() {

	let dir = plugin_dir! {
		"fleeting" => r#"
			provides = [ "demo:fleeting/api" ]
			destroy_on_load = true
		"#,
	};
	let ( manager, _ ) = dir.manager();
	let events = record_events( &manager );

	let id = manager.load_plugin( dir.file( "fleeting" ), None ).expect( "Failed to load fleeting" );

	assert!( manager.plugin( id ).is_none() );
	assert!( manager.interface_object( "demo:fleeting/api" ).is_none() );
	assert_eq!( *events.lock().unwrap(), vec![ "loaded:fleeting", "removed:fleeting" ]);

}

#[test]
fn destruction_from_on_loaded_during_batch() {

	let dir = plugin_dir! {
		"fleeting" => r#"
			provides = [ "demo:fleeting/api" ]
			destroy_on_load = true
		"#,
	};
	let ( manager, _ ) = dir.manager();
	let events = record_events( &manager );

	manager.load_plugins().expect( "Failed to load plugins" );

	assert!( manager.plugins().is_empty() );
	assert_eq!( *events.lock().unwrap(), vec![ "loaded:fleeting", "removed:fleeting", "batch:1/0" ]);

}
