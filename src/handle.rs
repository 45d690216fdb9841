//! State-tagged façade over the three lifecycle states.
//!
//! The concrete types (`GraphPool` → `GraphArchive` → `GraphIndex`)
//! enforce the lifecycle at compile time; this enum carries the same
//! storage behind a runtime tag for callers that keep one handle across
//! transitions, reporting `InvalidState` on a mismatched operation.
//! Transitions consume the handle, so a failed transition tears the
//! whole state down — partially converted storage never survives.

use crate::archive::GraphArchive;
use crate::error::Error;
use crate::graph::{Dir, GidPos, SectionInfo};
use crate::index::GraphIndex;
use crate::pool::{GraphPool, Params};
use crate::walker::KmerWalker;

/// A graph handle in one of the three lifecycle states.
pub enum SeedGraph {
    /// Append-only builder.
    Pool(GraphPool),
    /// Frozen, enumerable graph.
    Archive(GraphArchive),
    /// Frozen graph with the match table attached.
    Index(GraphIndex),
}

impl SeedGraph {
    /// Allocate an empty pool handle.
    pub fn new(params: Params) -> Result<Self, Error> {
        Ok(Self::Pool(GraphPool::new(params)?))
    }

    /// See [`GraphPool::append_segment`].
    pub fn append_segment(&mut self, name: &[u8], seq: &[u8]) -> Result<u32, Error> {
        match self {
            Self::Pool(p) => p.append_segment(name, seq),
            _ => Err(Error::InvalidState { expected: "pool" }),
        }
    }

    /// See [`GraphPool::append_link`].
    pub fn append_link(
        &mut self,
        src: &[u8],
        src_dir: Dir,
        dst: &[u8],
        dst_dir: Dir,
    ) -> Result<(u32, u32), Error> {
        match self {
            Self::Pool(p) => p.append_link(src, src_dir, dst, dst_dir),
            _ => Err(Error::InvalidState { expected: "pool" }),
        }
    }

    /// Reserved.
    pub fn append_snp(&mut self, name: &[u8], pos: u64, base: u8) -> Result<(), Error> {
        match self {
            Self::Pool(p) => p.append_snp(name, pos, base),
            _ => Err(Error::InvalidState { expected: "pool" }),
        }
    }

    /// Reserved.
    pub fn split_section(&mut self, name: &[u8], pos: u64) -> Result<(), Error> {
        match self {
            Self::Pool(p) => p.split_section(name, pos),
            _ => Err(Error::InvalidState { expected: "pool" }),
        }
    }

    /// `Pool → Archive`.
    pub fn freeze(self) -> Result<Self, Error> {
        match self {
            Self::Pool(p) => Ok(Self::Archive(p.freeze()?)),
            _ => Err(Error::InvalidState { expected: "pool" }),
        }
    }

    /// `Archive → Pool`.
    pub fn melt(self) -> Result<Self, Error> {
        match self {
            Self::Archive(a) => Ok(Self::Pool(a.melt())),
            _ => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// `Archive → Index`.
    pub fn build_index(self) -> Result<Self, Error> {
        match self {
            Self::Archive(a) => Ok(Self::Index(a.build_index()?)),
            _ => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// `Index → Archive`.
    pub fn disable_index(self) -> Result<Self, Error> {
        match self {
            Self::Index(i) => Ok(Self::Archive(i.disable_index())),
            _ => Err(Error::InvalidState { expected: "index" }),
        }
    }

    /// K-mer enumeration; defined on Archive and Index.
    pub fn kmers(&self) -> Result<KmerWalker<'_>, Error> {
        match self {
            Self::Archive(a) => Ok(a.kmers()),
            Self::Index(i) => Ok(i.kmers()),
            Self::Pool(_) => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// See [`GraphIndex::match_ascii`].
    pub fn match_ascii(&self, seq: &[u8]) -> Result<&[GidPos], Error> {
        match self {
            Self::Index(i) => Ok(i.match_ascii(seq)),
            _ => Err(Error::InvalidState { expected: "index" }),
        }
    }

    /// See [`GraphIndex::match_packed`].
    pub fn match_packed(&self, kmer: u64) -> Result<&[GidPos], Error> {
        match self {
            Self::Index(i) => Ok(i.match_packed(kmer)),
            _ => Err(Error::InvalidState { expected: "index" }),
        }
    }

    /// Section record `(id, len, base)`; defined on Archive and Index.
    pub fn get_section(&self, id: u32) -> Result<Option<SectionInfo>, Error> {
        match self {
            Self::Archive(a) => Ok(a.get_section(id)),
            Self::Index(i) => Ok(i.get_section(id)),
            Self::Pool(_) => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// Section name; defined on Archive and Index.
    pub fn get_name(&self, id: u32) -> Result<Option<&[u8]>, Error> {
        match self {
            Self::Archive(a) => Ok(a.get_name(id)),
            Self::Index(i) => Ok(i.get_name(id)),
            Self::Pool(_) => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// The 4-bit sequence buffer, one class per byte; defined on
    /// Archive and Index.
    pub fn seq(&self) -> Result<&[u8], Error> {
        match self {
            Self::Archive(a) => Ok(a.seq()),
            Self::Index(i) => Ok(i.seq()),
            Self::Pool(_) => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// Total stored sequence length in bases; defined on Archive and
    /// Index.
    pub fn total_len(&self) -> Result<u64, Error> {
        match self {
            Self::Archive(a) => Ok(a.total_len()),
            Self::Index(i) => Ok(i.total_len()),
            Self::Pool(_) => Err(Error::InvalidState { expected: "archive" }),
        }
    }

    /// Number of allocated sections in any state.
    pub fn section_count(&self) -> u32 {
        match self {
            Self::Pool(p) => p.section_count(),
            Self::Archive(a) => a.section_count(),
            Self::Index(i) => i.section_count(),
        }
    }
}
