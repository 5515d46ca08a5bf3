//! Dependency queries over loaded plugins.
//!
//! Edges are never stored. A plugin `p` depends on `q` when one of the interfaces
//! `p` required at load time is currently provided by `q`. Both directions are
//! derived from the [`InterfaceRegistry`] on demand, so they always reflect the
//! plugins that are loaded right now.

use std::collections::{ BTreeMap, BTreeSet };
use itertools::Itertools ;

use crate::{ InterfaceRegistry, LoadedPlugin, PluginId };



/// Plugins that `plugin` directly depends on, in load order.
///
/// Required interfaces without a current provider contribute nothing. A plugin
/// providing one of its own requirements is not reported as its own dependency.
pub(crate) fn depend_plugins(
	registry: &InterfaceRegistry,
	plugins: &BTreeMap<PluginId, LoadedPlugin>,
	plugin: PluginId,
) -> Vec<PluginId> {
	let Some( loaded ) = plugins.get( &plugin ) else { return Vec::new() };
	loaded.required.iter()
		.flat_map(| iid | registry.providers( iid ))
		.filter(| provider | *provider != plugin && plugins.contains_key( provider ))
		.sorted()
		.dedup()
		.collect()
}

/// Plugins that directly depend on `plugin`, in load order.
///
/// Scans every loaded plugin; plugin counts are small enough that a reverse index
/// would not pay for itself.
pub(crate) fn dependent_plugins(
	registry: &InterfaceRegistry,
	plugins: &BTreeMap<PluginId, LoadedPlugin>,
	plugin: PluginId,
) -> Vec<PluginId> {
	if !plugins.contains_key( &plugin ) { return Vec::new() }
	plugins.keys()
		.copied()
		.filter(| candidate | *candidate != plugin )
		.filter(| candidate | depend_plugins( registry, plugins, *candidate ).contains( &plugin ))
		.collect()
}

/// Order in which to unload every plugin so that dependents go before the plugins
/// they depend on.
///
/// With several providers per interface the relation may contain cycles; when no
/// plugin is free of remaining dependents the most recently loaded one goes next.
pub(crate) fn teardown_order(
	registry: &InterfaceRegistry,
	plugins: &BTreeMap<PluginId, LoadedPlugin>,
) -> Vec<PluginId> {

	let mut remaining = plugins.keys().copied().collect::<BTreeSet<_>>();
	let dependencies = plugins.keys()
		.map(| id | ( *id, depend_plugins( registry, plugins, *id )))
		.collect::<BTreeMap<_, _>>();
	let mut order = Vec::with_capacity( remaining.len() );

	while !remaining.is_empty() {

		let has_dependents = remaining.iter()
			.flat_map(| id | dependencies[id].iter().copied())
			.collect::<BTreeSet<_>>();

		let next = remaining.iter()
			.rev()
			.find(| id | !has_dependents.contains( id ))
			.or_else(|| remaining.iter().next_back())
			.copied();

		match next {
			Some( id ) => { remaining.remove( &id ); order.push( id ); },
			None => break,
		}
	}

	order

}
