//! The load scheduler.
//!
//! Dependency order between plugins is not known up front, so loading works by
//! retrying: each pass attempts every candidate that is neither loaded nor locked,
//! and passes repeat until one of them loads nothing new. Whatever is still waiting
//! at that point can never be satisfied and gets locked.

use std::path::{ Path, PathBuf };
use std::sync::Arc ;
use itertools::Itertools ;
use thiserror::Error ;

use crate::candidate::{ self, CandidateFile, CandidateState };
use crate::manager::{ Shared, State };
use crate::utils::PartialSuccess ;
use crate::{ BackendError, InterfaceId, LoadedPlugin, LoaderBackend, PluginEvent, PluginHandle, PluginId };



/// Why a file did not end up loaded.
///
/// Collected per file; none of these abort a batch.
#[derive( Debug, Error )]
pub enum LoadError {
	/// The backend could not parse or instantiate the file.
	#[error( "Failed to load {}: {source}", path.display() )]
	Backend { path: PathBuf, #[source] source: BackendError },
	/// The file declares a different interface id than the one requested.
	#[error( "{} implements {found}, expected {expected}", path.display() )]
	InterfaceMismatch { path: PathBuf, expected: InterfaceId, found: InterfaceId },
	/// Required interfaces never got a provider.
	#[error( "{} requires interfaces without a provider: {}", path.display(), missing.iter().join( ", " ))]
	UnsatisfiedDependencies { path: PathBuf, missing: Vec<InterfaceId> },
	/// The file was locked by an earlier failure and was not attempted again.
	#[error( "{} is locked after an earlier failure", path.display() )]
	Locked { path: PathBuf },
	/// The plugin directory, or one of its entries, could not be read.
	#[error( "Failed to read plugin directory {}: {source}", dir.display() )]
	Discovery { dir: PathBuf, #[source] source: std::io::Error },
}

impl LoadError {
	/// The file or directory the error is about.
	pub fn path( &self ) -> &Path {
		match self {
			Self::Backend { path, .. }
			| Self::InterfaceMismatch { path, .. }
			| Self::UnsatisfiedDependencies { path, .. }
			| Self::Locked { path } => path,
			Self::Discovery { dir, .. } => dir,
		}
	}
}

/// Outcome of handing one candidate to the backend.
pub(crate) enum Attempt {
	Loaded( PluginId ),
	Deferred( Vec<InterfaceId> ),
	Failed( LoadError ),
}

impl Shared {

	/// Tracks every new file in the plugin directory as a candidate. Entries that
	/// could not be read come back as failures, the rest are still tracked.
	fn discover( &self, backend: &dyn LoaderBackend ) -> PartialSuccess<usize, LoadError> {
		let dir = self.state().plugins_dir.clone();
		let ( files, errors ) = match candidate::scan_dir( &dir, backend ) {
			Ok( scanned ) => scanned,
			Err( source ) => return ( 0, vec![ LoadError::Discovery { dir, source }]),
		};
		let added = candidate::track( &mut self.state().candidates, files );
		tracing::debug!( dir = %dir.display(), added, unreadable = errors.len(), "Scanned plugin directory" );
		let failures = errors.into_iter()
			.map(| source | LoadError::Discovery { dir: dir.clone(), source })
			.collect();
		( added, failures )
	}

	/// Discovery as part of a batch: failures are collected, never fatal.
	fn discover_into( &self, backend: &dyn LoaderBackend, failures: &mut Vec<LoadError> ) {
		let ( _, errors ) = self.discover( backend );
		errors.iter().for_each(| err | tracing::warn!( error = %err, "Plugin discovery failed" ));
		failures.extend( errors );
	}

	/// Hands one file to the backend and, if every requirement is met, finalizes it.
	///
	/// The backend runs without the state lock held. The requirement check and the
	/// registration happen under a single lock so no observer can see a half-loaded
	/// plugin.
	pub(crate) fn attempt(
		self: &Arc<Self>,
		backend: &mut dyn LoaderBackend,
		path: &Path,
		filter: Option<&InterfaceId>,
	) -> Attempt {

		tracing::debug!( path = %path.display(), "Attempting plugin" );

		let loaded = match backend.try_load( path ) {
			Ok( loaded ) => loaded,
			Err( source ) => return self.lock_candidate( LoadError::Backend { path: path.to_path_buf(), source }),
		};

		if let Some( expected ) = filter.filter(| expected | **expected != loaded.iid ) {
			return self.lock_candidate( LoadError::InterfaceMismatch {
				path: path.to_path_buf(),
				expected: expected.clone(),
				found: loaded.iid,
			});
		}

		let required = loaded.object.required_interfaces().into_iter().unique().collect::<Vec<_>>();
		let provided = loaded.object.provides().into_iter().unique().collect::<Vec<_>>();

		let id = {
			let mut state = self.state();

			let missing = required.iter()
				.filter(| iid | !state.registry.contains( *iid ))
				.cloned()
				.collect::<Vec<_>>();

			if !missing.is_empty() {
				tracing::debug!( path = %path.display(), missing = %missing.iter().join( ", " ), "Deferring plugin" );
				state.set_candidate_state( path, CandidateState::Deferred { missing: missing.clone() });
				return Attempt::Deferred( missing );
			}

			let id = state.next_plugin_id();
			provided.iter().for_each(| iid | { state.registry.register( iid.clone(), id ); });
			state.plugins.insert( id, LoadedPlugin {
				id,
				path: path.to_path_buf(),
				iid: loaded.iid.clone(),
				object: Arc::clone( &loaded.object ),
				provided,
				required,
			});
			state.set_candidate_state( path, CandidateState::Loaded( id ));
			id
		};

		tracing::info!( plugin = %id, path = %path.display(), iid = %loaded.iid, "Plugin loaded" );
		self.notifier.emit( &PluginEvent::Loaded { id, object: Arc::clone( &loaded.object )});
		loaded.object.on_loaded( PluginHandle { id, manager: Arc::downgrade( self )});
		Attempt::Loaded( id )

	}

	/// One sweep over every schedulable candidate, in discovery order.
	///
	/// Returns the plugins loaded during the sweep and the candidates that got locked.
	fn run_pass(
		self: &Arc<Self>,
		backend: &mut dyn LoaderBackend,
		filter: Option<&InterfaceId>,
	) -> PartialSuccess<Vec<PluginId>, LoadError> {

		let paths = self.state().candidates.iter()
			.filter(| candidate | candidate.state.is_schedulable())
			.map(| candidate | candidate.path.clone())
			.collect::<Vec<_>>();

		let ( loaded, failures ) = paths.iter()
			.filter_map(| path | match self.attempt( &mut *backend, path, filter ) {
				Attempt::Loaded( id ) => Some( Ok( id )),
				Attempt::Deferred( _ ) => None,
				Attempt::Failed( err ) => Some( Err( err )),
			})
			.partition_result::<Vec<_>, Vec<_>, _, _>();

		tracing::debug!( attempted = paths.len(), loaded = loaded.len(), locked = failures.len(), "Load pass finished" );
		( loaded, failures )

	}

	/// Discovery followed by a single pass.
	pub(crate) fn run_single_pass(
		self: &Arc<Self>,
		backend: &mut dyn LoaderBackend,
		filter: Option<&InterfaceId>,
	) -> PartialSuccess<Vec<PluginId>, LoadError> {
		let mut failures = Vec::new();
		self.discover_into( backend, &mut failures );
		let ( loaded, errors ) = self.run_pass( backend, filter );
		failures.extend( errors );
		( loaded, failures )
	}

	/// Discovery followed by passes until one makes no progress.
	pub(crate) fn run_to_fixpoint(
		self: &Arc<Self>,
		backend: &mut dyn LoaderBackend,
	) -> PartialSuccess<Vec<PluginId>, LoadError> {

		let mut failures = Vec::new();
		self.discover_into( backend, &mut failures );

		let previously_locked = self.state().candidates.iter()
			.filter(| candidate | candidate.is_locked())
			.map(| candidate | candidate.path.clone())
			.collect::<Vec<_>>();

		let mut loaded = Vec::new();
		let mut passes = 0_usize ;
		loop {
			let ( ids, errors ) = self.run_pass( backend, None );
			passes += 1 ;
			failures.extend( errors );
			if ids.is_empty() { break }
			loaded.extend( ids );
		}

		let unsatisfied = self.state().lock_waiting();
		unsatisfied.iter().for_each(| err | tracing::warn!( error = %err, "Plugin locked" ));
		failures.extend( unsatisfied );
		failures.extend( previously_locked.into_iter().map(| path | LoadError::Locked { path }));

		tracing::info!( passes, loaded = loaded.len(), failed = failures.len(), "Plugin batch finished" );
		self.notifier.emit( &PluginEvent::BatchFinished { loaded: loaded.len(), failed: failures.len() });
		( loaded, failures )

	}

	fn lock_candidate( &self, err: LoadError ) -> Attempt {
		tracing::warn!( error = %err, "Plugin locked" );
		self.state().set_candidate_state( err.path(), CandidateState::Locked );
		Attempt::Failed( err )
	}

}

impl State {

	pub(crate) fn set_candidate_state( &mut self, path: &Path, state: CandidateState ) {
		match self.candidates.iter_mut().find(| candidate | candidate.path == path ) {
			Some( candidate ) => candidate.state = state,
			None => self.candidates.push( CandidateFile { path: path.to_path_buf(), state }),
		}
	}

	/// Locks every candidate still waiting on a dependency.
	fn lock_waiting( &mut self ) -> Vec<LoadError> {
		self.candidates.iter_mut()
			.filter(| candidate | candidate.state.is_schedulable())
			.map(| candidate | {
				let missing = match std::mem::replace( &mut candidate.state, CandidateState::Locked ) {
					CandidateState::Deferred { missing } => missing,
					_ => Vec::new(),
				};
				LoadError::UnsatisfiedDependencies { path: candidate.path.clone(), missing }
			})
			.collect()
	}

}
