use plugin_dock::{ InterfaceId, InterfaceRegistry, PluginId };

#[test]
fn unregister_removes_plugin_everywhere() {

	let mut registry = InterfaceRegistry::default();
	let ( a, b ) = ( PluginId::new( 1 ), PluginId::new( 2 ));
	registry.register( "demo:a/api".into(), a );
	registry.register( "demo:b/api".into(), a );
	registry.register( "demo:b/api".into(), b );

	let mut affected = registry.unregister( a );
	affected.sort();
	assert_eq!( affected, vec![ InterfaceId::new( "demo:a/api" ), InterfaceId::new( "demo:b/api" )]);

	assert!( !registry.contains( "demo:a/api" ));
	assert_eq!( registry.lookup_all( "demo:b/api" ), vec![ b ]);
	assert_eq!( registry.len(), 1 );

}

#[test]
fn unregister_preserves_order_of_remaining() {

	let mut registry = InterfaceRegistry::default();
	let iid = InterfaceId::new( "demo:log/sink" );
	let ( a, b, c ) = ( PluginId::new( 1 ), PluginId::new( 2 ), PluginId::new( 3 ));
	registry.register( iid.clone(), a );
	registry.register( iid.clone(), b );
	registry.register( iid.clone(), c );

	registry.unregister( b );
	assert_eq!( registry.lookup_all( &iid ), vec![ a, c ]);

	registry.unregister( a );
	assert_eq!( registry.lookup_one( &iid ), Some( c ));

}

#[test]
fn unregister_unknown_plugin() {

	let mut registry = InterfaceRegistry::default();
	registry.register( "demo:log/sink".into(), PluginId::new( 1 ));

	assert!( registry.unregister( PluginId::new( 2 )).is_empty() );
	assert_eq!( registry.lookup_all( "demo:log/sink" ), vec![ PluginId::new( 1 )]);

}

#[test]
fn unregister_last_provider_empties_registry() {

	let mut registry = InterfaceRegistry::default();
	registry.register( "demo:log/sink".into(), PluginId::new( 1 ));
	registry.unregister( PluginId::new( 1 ));

	assert!( registry.is_empty() );
	assert_eq!( registry.lookup_one( "demo:log/sink" ), None );

}
