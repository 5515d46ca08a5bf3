//! Interface identifiers.
//!
//! An interface is a named capability contract. Plugins declare which interfaces
//! they provide and which ones they require; the manager connects the two through
//! the [`InterfaceRegistry`]( crate::InterfaceRegistry ). Interfaces are not tied
//! to any specific plugin - they exist only as names that plugins agree on.

use std::borrow::Borrow ;
use std::sync::Arc ;



/// Stable name of a capability contract (e.g. `"my:package/greeter"`).
///
/// Cheap to clone. Two plugins naming the same `InterfaceId` in their provided and
/// required sets are connected during loading.
#[derive( Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd )]
pub struct InterfaceId( Arc<str> );

impl InterfaceId {
	/// Creates a new interface identifier.
	pub fn new( name: impl AsRef<str> ) -> Self { Self( Arc::from( name.as_ref() ))}

	/// The identifier as a string slice.
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl std::fmt::Display for InterfaceId {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> Result<(), std::fmt::Error> {
		std::fmt::Display::fmt( &self.0, f )
	}
}

impl From<&str> for InterfaceId {
	fn from( name: &str ) -> Self { Self::new( name )}
}

impl From<String> for InterfaceId {
	fn from( name: String ) -> Self { Self( Arc::from( name ))}
}

impl Borrow<str> for InterfaceId {
	fn borrow( &self ) -> &str { &self.0 }
}

impl AsRef<str> for InterfaceId {
	fn as_ref( &self ) -> &str { &self.0 }
}
