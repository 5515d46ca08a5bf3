use plugin_dock::CandidateState ;
use crate::plugin_fixtures::record_events ;

#[test]
fn rediscovery_does_not_reload() {

	let dir = plugin_dir! {
		"a-app" => r#"
			provides = [ "demo:app/main" ]
			requires = [ "demo:log/sink" ]
		"#,
		"b-logger" => r#"provides = [ "demo:log/sink" ]"#,
	};
	let ( manager, backend ) = dir.manager();

	let ( first, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );
	let attempts = backend.attempts().len();
	let events = record_events( &manager );

	let ( second, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );

	assert_eq!( first.len(), 2 );
	assert!( second.is_empty() );
	assert_eq!( backend.attempts().len(), attempts );
	assert_eq!( manager.plugins(), first );
	assert_eq!( manager.candidates().len(), 2 );
	assert_eq!( *events.lock().unwrap(), vec![ "batch:0/0" ]);

}

#[test]
fn rediscovery_picks_up_new_files_only() {

	let dir = plugin_dir! {
		"first" => r#"provides = [ "demo:first/api" ]"#,
	};
	let ( manager, backend ) = dir.manager();
	let _ = manager.load_plugins().expect( "Load rejected" );

	dir.add( "second", r#"provides = [ "demo:second/api" ]"# );
	let ( loaded, failures ) = manager.load_plugins().expect( "Load rejected" );
	assert_no_failures!( failures );

	assert_eq!( loaded.len(), 1 );
	assert_eq!( backend.attempts(), vec![ "first", "second" ]);
	assert!( manager.candidates().iter().all(| candidate | matches!( candidate.state(), CandidateState::Loaded( _ ))));

}

#[test]
fn rediscovery_keeps_locked_candidates_locked() {

	let dir = plugin_dir! {
		"broken" => "broken = true",
	};
	let ( manager, backend ) = dir.manager();

	for _ in 0..3 {
		let _ = manager.load_plugins().expect( "Load rejected" );
		assert!( manager.candidates()[0].is_locked() );
	}
	assert_eq!( backend.attempts_of( "broken" ), 1 );

}
