use std::path::PathBuf ;
use plugin_dock::{ ConfigError, ManagerConfig };

#[test]
fn config_parse_full() {

	let config = ManagerConfig::from_toml_str( r#"
		plugins-dir = "/opt/app/plugins"

		[settings]
		theme = "dark"
		language = "en"
	"# ).expect( "Invalid config" );

	assert_eq!( config.plugins_dir, Some( PathBuf::from( "/opt/app/plugins" )));
	assert_eq!( config.resolved_plugins_dir(), PathBuf::from( "/opt/app/plugins" ));
	assert_eq!( config.settings.len(), 2 );
	assert_eq!( config.settings.get( "theme" ).map( String::as_str ), Some( "dark" ));

}

#[test]
fn config_parse_empty() {
	let config = ManagerConfig::from_toml_str( "" ).expect( "Invalid config" );
	assert_eq!( config, ManagerConfig::default() );
}

#[test]
fn config_rejects_unknown_keys() {
	match ManagerConfig::from_toml_str( "plugin-dir = \"/typo\"" ) {
		Err( ConfigError::Parse( _ )) => {},
		other => panic!( "Expected Parse error, found: {:?}", other ),
	}
}

#[test]
fn config_from_file() {

	let dir = tempfile::tempdir().expect( "Failed to create directory" );
	let path = dir.path().join( "plugins.toml" );
	std::fs::write( &path, "[settings]\nkey = \"value\"\n" ).expect( "Failed to write config" );

	let config = ManagerConfig::from_file( &path ).expect( "Invalid config" );
	assert_eq!( config.plugins_dir, None );
	assert_eq!( config.settings.get( "key" ).map( String::as_str ), Some( "value" ));

}

#[test]
fn config_missing_file() {

	let dir = tempfile::tempdir().expect( "Failed to create directory" );
	let path = dir.path().join( "absent.toml" );

	match ManagerConfig::from_file( &path ) {
		Err( ConfigError::Io { path: reported, .. }) => assert_eq!( reported, path ),
		other => panic!( "Expected Io error, found: {:?}", other ),
	}

}
