//! Append-only graph builder: the Pool lifecycle state.

use log::debug;

use crate::error::Error;
use crate::graph::{Dir, LinkPair, NameMap, gid, gid_rev};
use crate::seq::SeqBuf;

/// Sections longer than this are silently truncated.
const MAX_SECTION_LEN: u64 = 0x8000_0000;

/// Input interpretation for `append_segment`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SeqFormat {
    /// IUPAC letters, encoded on append.
    #[default]
    Ascii,
    /// Pre-encoded 4-bit classes, adopted verbatim.
    FourBit,
}

/// Buffer handling for segment input. ASCII input is always encoded
/// into an owned copy; pre-encoded input is adopted without
/// re-encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Encode into owned storage.
    #[default]
    Copy,
    /// Adopt caller-encoded classes.
    NoCopy,
}

/// Index construction mode: `Hash` builds the prefix-bucket matcher,
/// `IterOnly` keeps the archive iterable without a match table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Prefix-bucket match table.
    #[default]
    Hash,
    /// K-mer enumeration only.
    IterOnly,
}

/// Pool construction parameters.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    seed_len: usize,
    hash_bucket_hint: usize,
    seq_format: SeqFormat,
    copy_mode: CopyMode,
    index_mode: IndexMode,
    num_threads: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed_len: 14,
            hash_bucket_hint: 1024,
            seq_format: SeqFormat::default(),
            copy_mode: CopyMode::default(),
            index_mode: IndexMode::default(),
            num_threads: 0,
        }
    }
}

impl Params {
    /// Set the seed length k (1..=32).
    pub fn with_seed_len(mut self, k: usize) -> Self {
        self.seed_len = k;
        self
    }
    /// Initial name-map capacity.
    pub fn with_hash_bucket_hint(mut self, n: usize) -> Self {
        self.hash_bucket_hint = n;
        self
    }
    /// Input format for `append_segment`.
    pub fn with_seq_format(mut self, f: SeqFormat) -> Self {
        self.seq_format = f;
        self
    }
    /// Buffer handling; must pair with the format (see [`CopyMode`]).
    pub fn with_copy_mode(mut self, m: CopyMode) -> Self {
        self.copy_mode = m;
        self
    }
    /// Index construction mode.
    pub fn with_index_mode(mut self, m: IndexMode) -> Self {
        self.index_mode = m;
        self
    }
    /// Sorter thread count (0 = sorter default).
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    pub(crate) fn seed_len(&self) -> usize {
        self.seed_len
    }
    pub(crate) fn index_mode(&self) -> IndexMode {
        self.index_mode
    }
    pub(crate) fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn validate(&self) -> Result<(), Error> {
        if self.seed_len < 1 || self.seed_len > 32 {
            return Err(Error::BadParam("seed length must be in 1..=32"));
        }
        match (self.seq_format, self.copy_mode) {
            (SeqFormat::Ascii, CopyMode::NoCopy) => {
                Err(Error::BadParam("ASCII input requires an owned copy"))
            }
            (SeqFormat::FourBit, CopyMode::Copy) => {
                Err(Error::BadParam("pre-encoded input is adopted, not copied"))
            }
            _ => Ok(()),
        }
    }
}

/// Storage shared by every lifecycle state: the name-interning section
/// map, the sequence buffer and the construction parameters. States
/// hand it to each other by move.
pub(crate) struct GraphStore {
    pub map: NameMap,
    pub seq: SeqBuf,
    pub params: Params,
}

/// Mutable reference-graph builder. Segments and links may arrive in
/// any order; a link may name a segment before its sequence is
/// supplied. [`freeze`] turns the pool into a [`GraphArchive`].
///
/// [`freeze`]: GraphPool::freeze
/// [`GraphArchive`]: crate::GraphArchive
pub struct GraphPool {
    pub(crate) store: GraphStore,
    pub(crate) links: Vec<LinkPair>,
}

impl GraphPool {
    /// Allocate an empty pool. Fails with `BadParam` on a seed length
    /// outside 1..=32 or an unsupported format/copy pairing.
    pub fn new(params: Params) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self {
            store: GraphStore {
                map: NameMap::with_capacity(params.hash_bucket_hint),
                seq: SeqBuf::default(),
                params,
            },
            links: Vec::new(),
        })
    }

    /// Append a named segment: resolve or allocate its id, encode (or
    /// adopt) the sequence and record the interval. Re-supplying a name
    /// overwrites the record, which also fills in a section a link
    /// mentioned first.
    pub fn append_segment(&mut self, name: &[u8], seq: &[u8]) -> Result<u32, Error> {
        let (base, tail) = match self.store.params.seq_format {
            SeqFormat::Ascii => self.store.seq.append_ascii(seq)?,
            SeqFormat::FourBit => self.store.seq.append_codes(seq)?,
        };
        let len = (tail - base).min(MAX_SECTION_LEN) as u32;

        let id = self.store.map.intern(name);
        let sec = self.store.map.get_mut(id).expect("just interned");
        sec.base_id = id;
        sec.len = len;
        sec.base = base;
        debug!("appended segment id={id} len={len} base={base}");
        Ok(id)
    }

    /// Append a directed edge between two oriented section ends,
    /// together with its complementary dual. Unknown names allocate
    /// empty sections. Returns the endpoint ids.
    pub fn append_link(
        &mut self,
        src: &[u8],
        src_dir: Dir,
        dst: &[u8],
        dst_dir: Dir,
    ) -> Result<(u32, u32), Error> {
        let src_id = self.store.map.intern(src);
        let dst_id = self.store.map.intern(dst);

        let from = gid(src_id, src_dir.bit());
        let to = gid(dst_id, dst_dir.bit());
        self.links
            .try_reserve(2)
            .map_err(|_| Error::OutOfMemory)?;
        self.links.push(LinkPair { from, to });
        self.links.push(LinkPair {
            from: gid_rev(to),
            to: gid_rev(from),
        });
        debug!("appended link {from} -> {to} and its dual");
        Ok((src_id, dst_id))
    }

    /// Reserved.
    pub fn append_snp(&mut self, _name: &[u8], _pos: u64, _base: u8) -> Result<(), Error> {
        Ok(())
    }

    /// Reserved.
    pub fn split_section(&mut self, _name: &[u8], _pos: u64) -> Result<(), Error> {
        Ok(())
    }

    /// The edge list as appended (each user link followed by its dual).
    pub fn links(&self) -> &[LinkPair] {
        &self.links
    }

    /// Number of allocated sections.
    pub fn section_count(&self) -> u32 {
        self.store.map.len()
    }
}
