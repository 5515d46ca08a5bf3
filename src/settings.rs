//! Settings storage handed through to plugins.
//!
//! The manager never reads or writes settings itself; it only keeps a reference
//! and forwards it to plugins via [`PluginHandle::settings`]( crate::PluginHandle::settings ).

use std::collections::BTreeMap ;
use std::sync::{ PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard };



/// Persistent key/value configuration store.
pub trait SettingsStore: Send + Sync {
	/// Value stored under `key`.
	fn value( &self, key: &str ) -> Option<String> ;
	/// Stores `value` under `key`, replacing any previous value.
	fn set_value( &self, key: &str, value: String );
	/// Removes `key`, returning the previous value.
	fn remove( &self, key: &str ) -> Option<String> ;
	/// All keys currently stored, sorted.
	fn keys( &self ) -> Vec<String> ;
}

/// A [`SettingsStore`] that lives in memory only.
#[derive( Debug, Default )]
pub struct MemorySettings {
	values: RwLock<BTreeMap<String, String>>,
}

impl MemorySettings {
	/// Creates an empty store.
	pub fn new() -> Self { Self::default() }
}

impl From<BTreeMap<String, String>> for MemorySettings {
	fn from( values: BTreeMap<String, String> ) -> Self {
		Self { values: RwLock::new( values )}
	}
}

impl MemorySettings {

	fn read( &self ) -> RwLockReadGuard<'_, BTreeMap<String, String>> {
		self.values.read().unwrap_or_else( PoisonError::into_inner )
	}

	fn write( &self ) -> RwLockWriteGuard<'_, BTreeMap<String, String>> {
		self.values.write().unwrap_or_else( PoisonError::into_inner )
	}

}

impl SettingsStore for MemorySettings {

	fn value( &self, key: &str ) -> Option<String> {
		self.read().get( key ).cloned()
	}

	fn set_value( &self, key: &str, value: String ) {
		self.write().insert( key.to_string(), value );
	}

	fn remove( &self, key: &str ) -> Option<String> {
		self.write().remove( key )
	}

	fn keys( &self ) -> Vec<String> {
		self.read().keys().cloned().collect()
	}

}

#[cfg( test )]
mod tests {

	use super::* ;

	#[test]
	fn memory_settings_survive_poisoning() {

		let store = MemorySettings::new();
		store.set_value( "kept", "1".to_string() );

		let poisoned = std::panic::catch_unwind( std::panic::AssertUnwindSafe(|| {
			let _guard = store.values.write().unwrap();
			panic!( "writer panicked" );
		}));
		assert!( poisoned.is_err() );
		assert!( store.values.is_poisoned() );

		store.set_value( "added", "2".to_string() );
		assert_eq!( store.value( "kept" ).as_deref(), Some( "1" ));
		assert_eq!( store.value( "added" ).as_deref(), Some( "2" ));
		assert_eq!( store.keys(), vec![ "added", "kept" ]);
		assert_eq!( store.remove( "kept" ).as_deref(), Some( "1" ));

	}

}
