//! Graph primitives: oriented vertex ids, section records, link pairs
//! and the name-interning section map.

use bytemuck::{Pod, Zeroable};
use fnv::FnvBuildHasher;
use indexmap::IndexMap;

/// Encode a section id and a direction bit into an oriented vertex id.
#[inline]
pub fn gid(id: u32, dir: u32) -> u32 {
    (id << 1) | (dir & 1)
}

/// The complementary vertex: same section, opposite orientation.
#[inline]
pub fn gid_rev(g: u32) -> u32 {
    g ^ 1
}

/// Section id of an oriented vertex.
#[inline]
pub fn gid_id(g: u32) -> u32 {
    g >> 1
}

/// Direction bit of an oriented vertex (0 = forward, 1 = reverse).
#[inline]
pub fn gid_dir(g: u32) -> u32 {
    g & 1
}

/// Orientation of a segment end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {
    /// As stored.
    Fwd,
    /// Reverse complement.
    Rev,
}

impl Dir {
    #[inline]
    pub(crate) fn bit(self) -> u32 {
        match self {
            Dir::Fwd => 0,
            Dir::Rev => 1,
        }
    }
}

/// A directed edge between two oriented vertices. Every user edge is
/// stored alongside its dual `(rev(to), rev(from))`.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable, PartialEq, Eq, Debug)]
pub struct LinkPair {
    /// Source vertex.
    pub from: u32,
    /// Destination vertex.
    pub to: u32,
}

/// Graph position entry `(gid, pos)`: the payload of the k-mer table.
/// `pos` is the walk start position within the origin section.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable, PartialEq, Eq, Debug)]
pub struct GidPos {
    /// Forward vertex of the origin section.
    pub gid: u32,
    /// Window start position within the origin section.
    pub pos: u32,
}

/// One k-mer walk emission. `kmer` leads so that the leading eight bytes
/// are the sort key and the position record survives the key-column
/// drop.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable, PartialEq, Eq, Debug)]
pub struct KmerTuple {
    /// Little-endian 2-bit packed k-mer.
    pub kmer: u64,
    /// Where its walk begins.
    pub pos: GidPos,
}

/// Public view of a section record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    /// Dense id, allocated in first-mention order from 0.
    pub id: u32,
    /// Sequence length in bases.
    pub len: u32,
    /// Base offset into the sequence buffer.
    pub base: u64,
}

/// Per-name section record. Created on first mention; a record
/// introduced by `append_link` keeps `len == 0` until its segment
/// arrives.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Section {
    pub id: u32,
    /// Originating section (self; kept for the reserved split
    /// operation).
    pub base_id: u32,
    pub len: u32,
    pub base: u64,
    /// Start of the forward vertex's slice in the compacted link table.
    pub fw_link_base: u32,
    /// Start of the reverse vertex's slice; doubles as the forward
    /// slice's end.
    pub rv_link_base: u32,
}

/// Insertion-ordered name → section map. Ids are dense, allocated from
/// 0 in first-mention order, and double as indices into the record
/// table.
pub(crate) struct NameMap {
    map: IndexMap<Box<[u8]>, Section, FnvBuildHasher>,
}

impl NameMap {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            map: IndexMap::with_capacity_and_hasher(cap, FnvBuildHasher::default()),
        }
    }

    /// Insert-or-lookup: the id for `name`, allocating the next dense id
    /// and a zeroed record on first mention.
    pub fn intern(&mut self, name: &[u8]) -> u32 {
        if let Some(i) = self.map.get_index_of(name) {
            return i as u32;
        }
        let id = self.map.len() as u32;
        self.map.insert(
            name.into(),
            Section {
                id,
                base_id: id,
                ..Section::default()
            },
        );
        id
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Section> {
        self.map.get_index(id as usize).map(|(_, s)| s)
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Section> {
        self.map.get_index_mut(id as usize).map(|(_, s)| s)
    }

    #[inline]
    pub fn name(&self, id: u32) -> Option<&[u8]> {
        self.map.get_index(id as usize).map(|(n, _)| n.as_ref())
    }

    /// Next unallocated id.
    #[inline]
    pub fn len(&self) -> u32 {
        self.map.len() as u32
    }

    /// Drop the most recently allocated record (retires the tail
    /// sentinel on melt).
    pub fn pop(&mut self) {
        let _ = self.map.pop();
    }

    /// Link-table offset where vertex `g`'s slice begins. The section
    /// records behave as a flat array of half-records indexed by gid,
    /// `2N + 1` entries deep: the sentinel's forward half terminates it.
    #[inline]
    pub fn link_base(&self, g: u32) -> u32 {
        let sec = self.get(gid_id(g)).expect("dense section id");
        if gid_dir(g) == 0 {
            sec.fw_link_base
        } else {
            sec.rv_link_base
        }
    }

    /// Write vertex `g`'s slice start (gid-transition scan of `freeze`).
    #[inline]
    pub fn set_link_base(&mut self, g: u32, v: u32) {
        let sec = self.get_mut(gid_id(g)).expect("dense section id");
        if gid_dir(g) == 0 {
            sec.fw_link_base = v;
        } else {
            sec.rv_link_base = v;
        }
    }
}
