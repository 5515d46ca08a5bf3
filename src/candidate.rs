//! Candidate files and plugin directory discovery.

use std::io ;
use std::path::{ Path, PathBuf };
use itertools::Itertools ;

use crate::{ InterfaceId, LoaderBackend, PartialSuccess, PluginId };



/// Scheduling state of a file found in the plugin directory.
///
/// `Unattempted → { Loaded, Deferred, Locked }`. `Deferred` candidates are retried
/// on the next pass, `Locked` is terminal.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum CandidateState {
	/// Discovered but never handed to the backend.
	Unattempted,
	/// Loaded fine, but these required interfaces had no provider yet.
	Deferred { missing: Vec<InterfaceId> },
	/// Loaded and registered as the given plugin.
	Loaded( PluginId ),
	/// Permanently excluded from scheduling after a terminal failure.
	Locked,
	/// Was loaded, then unloaded or destroyed. Not picked up by later batches.
	Released,
}

impl CandidateState {
	/// Whether a scheduling pass should attempt this candidate.
	#[inline] pub fn is_schedulable( &self ) -> bool {
		matches!( self, Self::Unattempted | Self::Deferred { .. })
	}
}

/// A file tracked by the scheduler.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct CandidateFile {
	pub(crate) path: PathBuf,
	pub(crate) state: CandidateState,
}

impl CandidateFile {
	pub(crate) fn new( path: PathBuf ) -> Self {
		Self { path, state: CandidateState::Unattempted }
	}

	/// Location of the file.
	#[inline] pub fn path( &self ) -> &Path { &self.path }
	/// Current scheduling state.
	#[inline] pub fn state( &self ) -> &CandidateState { &self.state }
	/// Whether the candidate has been permanently excluded from scheduling.
	#[inline] pub fn is_locked( &self ) -> bool { self.state == CandidateState::Locked }
}

/// Lists the files in `dir` the backend is willing to load, sorted by file name.
///
/// A directory that does not exist yields no files. An entry that cannot be read
/// is reported on its own, next to the files that could.
pub(crate) fn scan_dir<B: LoaderBackend + ?Sized>(
	dir: &Path,
	backend: &B,
) -> io::Result<PartialSuccess<Vec<PathBuf>, io::Error>> {

	let entries = match std::fs::read_dir( dir ) {
		Ok( entries ) => entries,
		Err( err ) if err.kind() == io::ErrorKind::NotFound => {
			tracing::warn!( dir = %dir.display(), "Plugin directory does not exist" );
			return Ok(( Vec::new(), Vec::new() ));
		},
		Err( err ) => return Err( err ),
	};

	Ok( select_files( entries.map_ok(| entry | entry.path()), backend ))

}

fn select_files<B: LoaderBackend + ?Sized>(
	entries: impl Iterator<Item = io::Result<PathBuf>>,
	backend: &B,
) -> PartialSuccess<Vec<PathBuf>, io::Error> {
	let ( files, errors ): ( Vec<_>, Vec<_> ) = entries.partition_result();
	let files = files.into_iter()
		.filter(| path | path.is_file() && backend.accepts( path ))
		.map( normalize )
		.sorted_by(| a, b | a.file_name().cmp( &b.file_name() ))
		.collect();
	( files, errors )
}

/// The form candidate paths are compared in: made absolute against the working
/// directory. Symlinks are left alone. Falls back to the path as given.
pub(crate) fn normalize( path: impl AsRef<Path> ) -> PathBuf {
	let path = path.as_ref();
	std::path::absolute( path ).unwrap_or_else(|_| path.to_path_buf() )
}

/// Appends a candidate for every path not already tracked. Existing candidates keep
/// their state. Returns how many were added.
pub(crate) fn track( candidates: &mut Vec<CandidateFile>, paths: impl IntoIterator<Item = PathBuf> ) -> usize {
	let before = candidates.len();
	paths.into_iter().for_each(| path | {
		if !candidates.iter().any(| candidate | candidate.path == path ) {
			candidates.push( CandidateFile::new( path ));
		}
	});
	candidates.len() - before
}

#[cfg( test )]
mod tests {

	use super::* ;
	use crate::{ BackendError, Loaded };

	struct AnyFile ;

	impl LoaderBackend for AnyFile {
		fn try_load( &mut self, _: &Path ) -> Result<Loaded, BackendError> { Err( "never loaded".into() ) }
	}

	#[test]
	fn unreadable_entry_keeps_the_rest_of_the_scan() {

		let dir = tempfile::tempdir().expect( "Failed to create directory" );
		let first = dir.path().join( "a.plugin" );
		let second = dir.path().join( "b.plugin" );
		std::fs::write( &first, "" ).expect( "Failed to write file" );
		std::fs::write( &second, "" ).expect( "Failed to write file" );

		let entries = vec![
			Ok( second.clone() ),
			Err( io::Error::other( "entry vanished" )),
			Ok( first.clone() ),
		];
		let ( files, errors ) = select_files( entries.into_iter(), &AnyFile );

		assert_eq!( files, vec![ first, second ]);
		assert_eq!( errors.len(), 1 );
		assert_eq!( errors[0].to_string(), "entry vanished" );

	}

	#[test]
	fn relative_paths_are_made_absolute() {
		let path = normalize( "plugins/a.plugin" );
		assert!( path.is_absolute() );
		assert!( path.ends_with( "plugins/a.plugin" ));
		assert_eq!( normalize( &path ), path );
	}

}
