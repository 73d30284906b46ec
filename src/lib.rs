//! Functionality for ordering and orienting contigs along a genetic linkage map.
//!
//! A pseudomolecule is built for each linkage group from two inputs: a
//! genetic map giving the linkage group and position (in centiMorgans) of each
//! marker, and a marker info table giving the contig, contig position, and
//! weight of each marker. Each [`Contig`] is placed on the linkage group of its
//! best-supported markers, at the weighted mean of their genetic positions,
//! and oriented by the co-linearity of its markers. Each [`LinkageGroupMap`]
//! then removes contigs contained in a better-supported neighbour.
//!
//! Here is an example which assembles pseudomolecules from two files and
//! writes them to a file:
//!
//! ```no_run
//! use contigmap::prelude::*;
//! let config = Config {
//!     genetic_map: "genetic_map.txt".to_string(),
//!     marker_info: "marker_info.tsv.gz".to_string(),
//!     output: Some("pseudomolecules.txt".to_string()),
//!     ..Config::default()
//! };
//! let summary = run(&config).expect("assembly failed");
//! println!("placed {} of {} contigs", summary.placed, summary.contigs);
//! ```
//!
//! This example can be run on the command line with:
//!
//! ```bash
//! cargo run --features=cli -- build --map genetic_map.txt --markers marker_info.tsv.gz \
//!     --output pseudomolecules.txt
//! ```
//!
//! Contigs can also be placed one by one:
//!
//! ```
//! use contigmap::prelude::*;
//!
//! let mut markers = MarkerRegistry::new();
//! for (name, gen_pos, con_pos) in [("m1", 1000, 100), ("m2", 2000, 200)] {
//!     markers.record_genetic(name, gen_pos, "LG1");
//!     markers.record_placement(name, "ctg1", con_pos, 5);
//! }
//! let markers = markers.freeze();
//!
//! let mut contig = Contig::new("ctg1");
//! contig.add_markers(markers.resolve(&["m1".to_string(), "m2".to_string()]));
//! contig.complete();
//! assert_eq!(contig.lg, "LG1");
//! assert_eq!(contig.gen_pos, 1500);
//! assert_eq!(contig.orientation, Strand::Forward);
//! ```

pub mod contig;
pub mod error;
pub mod file;
pub mod linkage_group;
pub mod marker;
mod numeric;
pub mod order;
pub mod orient;
pub mod parse;
pub mod pipeline;
pub mod token;

pub use contig::{Contig, ContigError};
pub use error::ContigMapError;
pub use linkage_group::LinkageGroupMap;
pub use marker::{Marker, MarkerRegistry, SharedMarkers};
pub use orient::Strand;
pub use pipeline::{assemble, run, Config, Summary};

pub mod prelude {
    pub use crate::contig::{Contig, ContigError, UNPLACED};
    pub use crate::error::ContigMapError;
    pub use crate::linkage_group::LinkageGroupMap;
    pub use crate::marker::{MapPosition, Marker, MarkerRegistry, Position, SharedMarkers, Weight};
    pub use crate::orient::{orient_markers, Strand};
    pub use crate::parse::{read_genetic_map, read_marker_info};
    pub use crate::pipeline::{assemble, run, Config, Summary};
    pub use crate::token::Token;
}
