//! K-mer match index: sorted position table plus a prefix bucket array
//! keyed by the packed k-mer value.

use log::debug;

use crate::archive::GraphArchive;
use crate::encode::{kmer_mask, pack_query};
use crate::error::Error;
use crate::graph::{GidPos, SectionInfo};
use crate::pool::IndexMode;
use crate::sort::sort_by_key;
use crate::walker::KmerWalker;

/// Queryable index: `bucket[v]` counts tuples with k-mer < v, so
/// `table[bucket[v]..bucket[v + 1]]` is exactly the position set of v.
pub struct GraphIndex {
    acv: GraphArchive,
    mask: u64,
    buckets: Vec<usize>,
    table: Vec<GidPos>,
}

impl GraphArchive {
    /// Drain the k-mer walk, sort the tuples, fill the prefix bucket
    /// array (4^k + 1 entries) and drop the key column, keeping only
    /// positions. On failure everything is dropped.
    pub fn build_index(self) -> Result<GraphIndex, Error> {
        if self.store.params.index_mode() != IndexMode::Hash {
            return Err(Error::BadParam("index disabled by configuration"));
        }
        let k = self.store.params.seed_len();

        let mut tuples = Vec::new();
        for t in self.kmers() {
            tuples.push(t?);
        }

        sort_by_key(&mut tuples, 8, self.store.params.num_threads())?;

        let bucket_count = 1usize
            .checked_shl(2 * k as u32)
            .ok_or(Error::OutOfMemory)?;
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count + 1)
            .map_err(|_| Error::OutOfMemory)?;

        buckets.push(0);
        let mut prev = 0u64;
        for (i, t) in tuples.iter().enumerate() {
            if t.kmer == prev {
                continue;
            }
            for _ in prev..t.kmer {
                buckets.push(i);
            }
            prev = t.kmer;
        }
        while buckets.len() < bucket_count + 1 {
            buckets.push(tuples.len());
        }

        debug!("built index: {} tuples over {bucket_count} buckets", tuples.len());

        // key-column drop: the position record is the tuple's tail
        let table: Vec<GidPos> = tuples.iter().map(|t| t.pos).collect();
        Ok(GraphIndex {
            acv: self,
            mask: kmer_mask(k),
            buckets,
            table,
        })
    }
}

impl GraphIndex {
    /// Every graph position of a packed k-mer, in walk order.
    #[inline]
    pub fn match_packed(&self, kmer: u64) -> &[GidPos] {
        let v = (kmer & self.mask) as usize;
        &self.table[self.buckets[v]..self.buckets[v + 1]]
    }

    /// Pack the leading k ASCII bases (2-bit table; `N` and unmapped
    /// bytes read as `A`) and match. A query shorter than the seed
    /// length matches nothing.
    pub fn match_ascii(&self, seq: &[u8]) -> &[GidPos] {
        let k = self.acv.store.params.seed_len();
        if seq.len() < k {
            return &[];
        }
        self.match_packed(pack_query(seq, k))
    }

    /// Release the match tables and return to the archive state; the
    /// compacted link table is retained.
    pub fn disable_index(self) -> GraphArchive {
        self.acv
    }

    /// Lazy stream of every `(kmer, gid, pos)` walk emission.
    pub fn kmers(&self) -> KmerWalker<'_> {
        self.acv.kmers()
    }

    /// Section record `(id, len, base)`, if allocated.
    pub fn get_section(&self, id: u32) -> Option<SectionInfo> {
        self.acv.get_section(id)
    }

    /// The name a section was first mentioned under.
    pub fn get_name(&self, id: u32) -> Option<&[u8]> {
        self.acv.get_name(id)
    }

    /// Section id of a vertex, for resolving match hits.
    pub fn section_of(&self, g: u32) -> Option<SectionInfo> {
        self.acv.section_of(g)
    }

    /// The 4-bit sequence buffer, one class per byte.
    pub fn seq(&self) -> &[u8] {
        self.acv.seq()
    }

    /// Total stored sequence length in bases.
    pub fn total_len(&self) -> u64 {
        self.acv.total_len()
    }

    /// Number of allocated sections, tail sentinel included.
    pub fn section_count(&self) -> u32 {
        self.acv.section_count()
    }
}
