//! K-mer seed index over a bidirected string graph (edition 2024).
//!
//! Named sections carry IUPAC nucleotide sequences; links join oriented
//! section ends, every edge paired with its complementary dual. The
//! append-only [`GraphPool`] freezes into a [`GraphArchive`] whose link
//! table is compacted into per-vertex slices; the archive enumerates
//! every k-long walk from every section position — crossing links and
//! expanding ambiguity codes into all concrete A/C/G/T combinations —
//! and [`GraphArchive::build_index`] sorts those walks into a
//! prefix-bucketed table for O(1) exact match.
//!
//! Lifecycle: `Pool --freeze--> Archive --build_index--> Index`, with
//! `melt` and `disable_index` as the inverse steps. The concrete types
//! enforce the ordering at compile time; [`SeedGraph`] offers the same
//! operations behind a runtime state tag.

mod archive;
pub mod encode;
mod error;
mod graph;
mod handle;
mod index;
mod pool;
mod seq;
mod sort;
mod walker;

pub use archive::GraphArchive;
pub use error::Error;
pub use graph::{Dir, GidPos, KmerTuple, LinkPair, SectionInfo, gid, gid_dir, gid_id, gid_rev};
pub use handle::SeedGraph;
pub use index::GraphIndex;
pub use pool::{CopyMode, GraphPool, IndexMode, Params, SeqFormat};
pub use walker::KmerWalker;
