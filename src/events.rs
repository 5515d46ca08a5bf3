//! Lifecycle notifications.
//!
//! Observers are plain closures. They are called synchronously on the thread that
//! caused the change, after the manager's internal state has been updated and with
//! no internal lock held, so an observer may freely query the manager.

use std::sync::{ Arc, Mutex, PoisonError };

use crate::{ PluginId, PluginObject };



/// Something that happened to the set of loaded plugins.
#[derive( Clone )]
pub enum PluginEvent {
	/// A plugin finished loading and its interfaces are registered.
	Loaded { id: PluginId, object: Arc<dyn PluginObject> },
	/// A plugin was unregistered, explicitly or because its object was destroyed.
	Removed { id: PluginId, object: Arc<dyn PluginObject> },
	/// A [`load_plugins`]( crate::PluginManager::load_plugins ) call converged.
	BatchFinished { loaded: usize, failed: usize },
}

impl PluginEvent {
	/// The plugin this event is about, if any.
	pub fn plugin_id( &self ) -> Option<PluginId> {
		match self {
			Self::Loaded { id, .. } | Self::Removed { id, .. } => Some( *id ),
			Self::BatchFinished { .. } => None,
		}
	}
}

impl std::fmt::Debug for PluginEvent {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match self {
			Self::Loaded { id, .. } => f.debug_struct( "Loaded" ).field( "id", id ).finish_non_exhaustive(),
			Self::Removed { id, .. } => f.debug_struct( "Removed" ).field( "id", id ).finish_non_exhaustive(),
			Self::BatchFinished { loaded, failed } => f.debug_struct( "BatchFinished" )
				.field( "loaded", loaded )
				.field( "failed", failed )
				.finish(),
		}
	}
}

/// Token returned by [`PluginManager::subscribe`]( crate::PluginManager::subscribe ).
#[derive( Copy, Clone, Debug, Eq, Hash, PartialEq )]
pub struct SubscriptionId( u64 );

type Observer = Arc<dyn Fn( &PluginEvent ) + Send + Sync> ;

#[derive( Default )]
pub(crate) struct Notifier {
	observers: Mutex<( u64, Vec<( SubscriptionId, Observer )> )>,
}

impl Notifier {

	pub(crate) fn subscribe( &self, observer: impl Fn( &PluginEvent ) + Send + Sync + 'static ) -> SubscriptionId {
		let mut guard = self.observers.lock().unwrap_or_else( PoisonError::into_inner );
		let ( next_id, observers ) = &mut *guard ;
		*next_id += 1 ;
		let id = SubscriptionId( *next_id );
		observers.push(( id, Arc::new( observer )));
		id
	}

	pub(crate) fn unsubscribe( &self, id: SubscriptionId ) -> bool {
		let mut guard = self.observers.lock().unwrap_or_else( PoisonError::into_inner );
		let before = guard.1.len();
		guard.1.retain(|( subscription, _ )| *subscription != id );
		guard.1.len() != before
	}

	/// Delivers `event` to a snapshot of the current observers, so observers may
	/// subscribe or unsubscribe from inside a callback.
	pub(crate) fn emit( &self, event: &PluginEvent ) {
		let observers = self.observers.lock()
			.unwrap_or_else( PoisonError::into_inner )
			.1.iter()
			.map(|( _, observer )| Arc::clone( observer ))
			.collect::<Vec<_>>();
		observers.iter().for_each(| observer | observer( event ));
	}

}
