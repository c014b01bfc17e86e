//! FILENAME: core/geo/src/lib.rs
//! PURPOSE: Map-side derivations: coordinates, colour bands and markers.
//! CONTEXT: Everything here is a pure function of the active dataset except
//! the IconCache, which is an injected memo owned by the caller.

pub mod bands;
pub mod coords;
pub mod icons;
pub mod markers;

pub use bands::{Band, BandTable};
pub use coords::{extract, parse_pair, LatLng};
pub use icons::{IconCache, MarkerIcon};
pub use markers::{build_markers, Marker, MarkerSet, HEADROOM_FIELD};
