//! Link-table compaction: `freeze` sorts the Pool's unordered edge list
//! into per-vertex contiguous slices, `melt` reverses it.

use log::debug;

use crate::error::Error;
use crate::graph::{LinkPair, NameMap, Section, SectionInfo, gid_id};
use crate::pool::{GraphPool, GraphStore};
use crate::sort::sort_by_key;
use crate::walker::KmerWalker;

/// Name stem probed for the tail sentinel; `0`s are appended until the
/// name is unused.
const SENTINEL_STEM: &[u8] = b"tail_sentinel_";

/// Frozen graph: sections are immutable and the link table holds only
/// destination vertices, sliced per source vertex. The archive can
/// enumerate every k-mer walk ([`kmers`]) and be advanced to a
/// [`GraphIndex`] or melted back into a [`GraphPool`].
///
/// [`kmers`]: GraphArchive::kmers
/// [`GraphIndex`]: crate::GraphIndex
pub struct GraphArchive {
    pub(crate) store: GraphStore,
    /// Compacted link table: destination gids only.
    pub(crate) links: Vec<u32>,
    /// Tail sentinel section id; every id below it is a real section.
    pub(crate) tail_id: u32,
}

impl GraphPool {
    /// Compact the link table and freeze the graph.
    ///
    /// Appends the tail sentinel, sorts the edge list by source vertex,
    /// writes each vertex's slice bounds through the gid-indexed
    /// half-record view, and projects `(from, to)` pairs down to their
    /// destinations, halving the footprint. On failure the pool is
    /// dropped whole.
    pub fn freeze(self) -> Result<GraphArchive, Error> {
        let GraphPool { mut store, mut links } = self;

        let tail_id = add_tail_sentinel(&mut store.map);

        sort_by_key(&mut links, 4, store.params.num_threads())?;

        // gid-transition scan; the half-record view has 2N + 1 live
        // entries, the sentinel's forward half holding the total
        let total = links.len() as u32;
        let gid_count = 2 * tail_id;
        store.map.set_link_base(0, 0);
        let mut prev = 0u32;
        for (i, pair) in links.iter().enumerate() {
            if pair.from == prev {
                continue;
            }
            for g in prev + 1..=pair.from {
                store.map.set_link_base(g, i as u32);
            }
            prev = pair.from;
        }
        for g in prev + 1..=gid_count {
            store.map.set_link_base(g, total);
        }

        // project (from, to) -> to; the pair list is dropped
        let gids: Vec<u32> = links.iter().map(|p| p.to).collect();

        debug!("froze pool: {} sections, {total} links", tail_id);
        Ok(GraphArchive {
            store,
            links: gids,
            tail_id,
        })
    }
}

/// Allocate the sentinel section terminating the gid-indexed offset
/// array. Its id is the next unallocated one; the name is probed until
/// fresh so user names never collide.
fn add_tail_sentinel(map: &mut NameMap) -> u32 {
    let tail_id = map.len();
    let mut name = SENTINEL_STEM.to_vec();
    loop {
        name.push(b'0');
        if map.intern(&name) == tail_id || name.len() > 256 {
            break;
        }
    }
    tail_id
}

impl GraphArchive {
    /// Undo [`freeze`](GraphPool::freeze): re-expand the compacted table
    /// into `(from, to)` pairs (the owning slice's gid supplies `from`)
    /// and retire the tail sentinel. The resulting pool's link multiset
    /// is identical to the pre-freeze one.
    pub fn melt(self) -> GraphPool {
        let GraphArchive {
            mut store,
            links,
            tail_id,
        } = self;

        let mut pairs = Vec::with_capacity(links.len());
        for g in 0..2 * tail_id {
            let lo = store.map.link_base(g) as usize;
            let hi = store.map.link_base(g + 1) as usize;
            for &to in &links[lo..hi] {
                pairs.push(LinkPair { from: g, to });
            }
        }

        // the sentinel is always the most recently allocated id
        store.map.pop();
        debug!("melted archive: {} links restored", pairs.len());
        GraphPool {
            store,
            links: pairs,
        }
    }

    /// Lazy stream of every `(kmer, gid, pos)` walk emission.
    pub fn kmers(&self) -> KmerWalker<'_> {
        KmerWalker::new(self)
    }

    /// Section record `(id, len, base)`, if allocated.
    pub fn get_section(&self, id: u32) -> Option<SectionInfo> {
        self.store.map.get(id).map(|s| SectionInfo {
            id: s.id,
            len: s.len,
            base: s.base,
        })
    }

    /// The name a section was first mentioned under; a section produced
    /// by a split resolves to its originating name.
    pub fn get_name(&self, id: u32) -> Option<&[u8]> {
        let sec = self.store.map.get(id)?;
        self.store.map.name(sec.base_id)
    }

    /// The 4-bit sequence buffer, one class per byte.
    pub fn seq(&self) -> &[u8] {
        self.store.seq.as_slice()
    }

    /// Total stored sequence length in bases.
    pub fn total_len(&self) -> u64 {
        self.store.seq.len()
    }

    /// Number of allocated sections, tail sentinel included.
    pub fn section_count(&self) -> u32 {
        self.store.map.len()
    }

    #[inline]
    pub(crate) fn section(&self, id: u32) -> &Section {
        self.store.map.get(id).expect("dense section id")
    }

    #[inline]
    pub(crate) fn link_base(&self, g: u32) -> u32 {
        self.store.map.link_base(g)
    }

    #[inline]
    pub(crate) fn base_at(&self, base: u64, len: u32, dir: u32, pos: u32) -> u8 {
        self.store.seq.base_at(base, len, dir, pos)
    }

    /// Section id of a vertex, for callers resolving match hits.
    pub fn section_of(&self, g: u32) -> Option<SectionInfo> {
        self.get_section(gid_id(g))
    }
}
