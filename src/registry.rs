//! Interface registry.
//!
//! A one-to-many map from [`InterfaceId`] to the plugins currently providing it.
//! Providers are kept in registration order, which is load order, so
//! [`lookup_one`]( InterfaceRegistry::lookup_one ) is deterministic.

use std::borrow::Borrow ;
use std::collections::HashMap ;
use std::hash::Hash ;
use nonempty_collections::NEVec ;
use pipe_trait::Pipe ;

use crate::InterfaceId ;
use crate::PluginId ;



/// Multi-valued mapping from interface to providers.
///
/// An interface only has an entry while at least one plugin provides it; the
/// [`NEVec`] rules out empty entries. The registry never triggers loads or
/// notifications itself.
///
/// ```
/// use plugin_dock::{ InterfaceRegistry, InterfaceId, PluginId };
///
/// let ( a, b ) = ( PluginId::new( 1 ), PluginId::new( 2 ));
/// let mut registry = InterfaceRegistry::default();
/// let iid = InterfaceId::new( "demo:log/sink" );
///
/// registry.register( iid.clone(), a );
/// registry.register( iid.clone(), b );
/// registry.register( iid.clone(), a ); // no-op
///
/// assert_eq!( registry.lookup_one( &iid ), Some( a ));
/// assert_eq!( registry.lookup_all( &iid ), vec![ a, b ]);
/// ```
#[derive( Debug, Default, Clone )]
pub struct InterfaceRegistry {
	entries: HashMap<InterfaceId, NEVec<PluginId>>,
}

impl InterfaceRegistry {

	/// Appends `plugin` to the providers of `iid`.
	///
	/// Registering a plugin that already provides `iid` is a no-op. Returns whether
	/// the registry changed.
	pub fn register( &mut self, iid: InterfaceId, plugin: PluginId ) -> bool {
		match self.entries.get_mut( &iid ) {
			Some( providers ) if providers.iter().into_iter().any(| p | *p == plugin ) => false,
			Some( providers ) => { providers.push( plugin ); true },
			None => { self.entries.insert( iid, NEVec::new( plugin )); true },
		}
	}

	/// First registered provider of `iid`, if any.
	pub fn lookup_one<Q>( &self, iid: &Q ) -> Option<PluginId>
	where
		InterfaceId: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.entries.get( iid ).map(| providers | *providers.first())
	}

	/// All providers of `iid` in registration order. Empty if none.
	pub fn lookup_all<Q>( &self, iid: &Q ) -> Vec<PluginId>
	where
		InterfaceId: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.entries.get( iid )
			.into_iter()
			.flat_map(| providers | providers.iter().into_iter().copied())
			.collect()
	}

	/// Whether at least one plugin provides `iid`.
	pub fn contains<Q>( &self, iid: &Q ) -> bool
	where
		InterfaceId: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.entries.contains_key( iid )
	}

	/// Removes `plugin` from every interface it appears under.
	///
	/// Returns the interfaces it was removed from.
	pub fn unregister( &mut self, plugin: PluginId ) -> Vec<InterfaceId> {

		let affected = self.entries.iter()
			.filter(|( _, providers )| providers.iter().into_iter().any(| p | *p == plugin ))
			.map(|( iid, _ )| iid.clone())
			.collect::<Vec<_>>();

		affected.iter().for_each(| iid | {
			let remaining = self.entries.remove( iid )
				.into_iter()
				.flat_map( Vec::from )
				.filter(| p | *p != plugin )
				.collect::<Vec<_>>()
				.pipe( NEVec::try_from_vec );
			if let Some( remaining ) = remaining { self.entries.insert( iid.clone(), remaining ); }
		});

		affected

	}

	/// Interfaces that currently have at least one provider.
	pub fn interfaces( &self ) -> impl Iterator<Item = &InterfaceId> + '_ {
		self.entries.keys()
	}

	/// Number of interfaces with at least one provider.
	pub fn len( &self ) -> usize { self.entries.len() }

	/// Whether no interface has a provider.
	pub fn is_empty( &self ) -> bool { self.entries.is_empty() }

	pub(crate) fn providers<'a, Q>( &'a self, iid: &Q ) -> impl Iterator<Item = PluginId> + 'a
	where
		InterfaceId: Borrow<Q>,
		Q: Hash + Eq + ?Sized + 'a,
	{
		self.entries.get( iid )
			.into_iter()
			.flat_map(| providers | providers.iter().into_iter().copied())
	}

}
