//! Ambiguity-expanding k-mer walk.
//!
//! A depth-first traversal that emits every k-long window starting at
//! every section position, following forward links when a window crosses
//! a section boundary and expanding IUPAC classes into all concrete
//! base combinations. Walks originate at forward vertices only; the
//! reverse-strand walks are covered by the dual edges the builder
//! stores.

use log::trace;

use crate::archive::GraphArchive;
use crate::encode::{EXPAND_2BIT, POPCNT_4BIT};
use crate::error::Error;
use crate::graph::{GidPos, KmerTuple, Section, gid, gid_dir, gid_id};

/// Frames deeper than this are refused. A budget-consuming path can
/// never get here; only a cycle through empty sections could.
const MAX_DEPTH: usize = 64;

/// Expansion state carried per stack level: the live window values plus
/// the popcount history that drives the duplicate collapse.
#[derive(Clone)]
struct Expansion {
    /// Live k-mer values; `buf[..occ]` is meaningful.
    buf: Vec<u64>,
    occ: usize,
    /// Popcount of the i-th most recent symbol at bits `2i..2i+2`.
    cnt_arr: u64,
    /// In-window symbols with popcount 0; emission is suppressed while
    /// non-zero.
    gaps: u32,
    /// Symbols consumed on the walk path so far.
    consumed: u32,
}

impl Expansion {
    fn fresh() -> Self {
        Self {
            buf: vec![0],
            occ: 1,
            cnt_arr: 0,
            gaps: 0,
            consumed: 0,
        }
    }

    /// Consume one 4-bit class: record its popcount, expand the live
    /// values, then collapse the duplicates left by the symbol that
    /// rolled off the window edge.
    fn step(&mut self, c: u8, k: u32, shift: u32, max_occ: usize) -> Result<(), Error> {
        // fan-out of the symbol leaving the k-window, read before the
        // history shift so k == 32 stays inside the register
        let leaving = if self.consumed >= k {
            Some((self.cnt_arr >> shift) & 0x3)
        } else {
            None
        };
        self.consumed += 1;
        self.shift_in(c, shift, max_occ)?;
        match leaving {
            Some(0) => self.gaps -= 1,
            Some(s) if s > 1 => self.collapse(s as usize),
            _ => {}
        }
        Ok(())
    }

    /// Shift one class into every live value, duplicating the set once
    /// per concrete base the class expands to.
    fn shift_in(&mut self, c: u8, shift: u32, max_occ: usize) -> Result<(), Error> {
        let class = (c & 0x0f) as usize;
        let p = POPCNT_4BIT[class] as usize;
        self.cnt_arr = (self.cnt_arr << 2) | p as u64;

        if p == 0 {
            // gap: carry a single placeholder branch so group strides
            // stay aligned; `gaps` keeps the emission gate shut
            self.gaps += 1;
            for e in &mut self.buf[..self.occ] {
                *e >>= 2;
            }
            return Ok(());
        }

        if self.occ * p > max_occ {
            return Err(Error::OutOfMemory);
        }
        if self.buf.len() < self.occ * p {
            self.buf.resize(self.occ * p, 0);
        }
        for j in 1..p {
            self.buf.copy_within(0..self.occ, j * self.occ);
        }
        for j in 0..p {
            let code = (EXPAND_2BIT[class][j] as u64) << shift;
            for e in &mut self.buf[j * self.occ..(j + 1) * self.occ] {
                *e = (*e >> 2) | code;
            }
        }
        self.occ *= p;
        Ok(())
    }

    /// The departed symbol's expansions are adjacent duplicates with
    /// its fan-out as stride (the oldest window slot varies fastest);
    /// keep one entry per group.
    fn collapse(&mut self, stride: usize) {
        debug_assert_eq!(self.occ % stride, 0);
        self.occ /= stride;
        for j in 0..self.occ {
            self.buf[j] = self.buf[j * stride];
        }
    }
}

/// One level of the walk frontier: a section being consumed in a fixed
/// orientation, its link cursor, the budget left for descendants and an
/// owned expansion state. Children clone the parent's expansion so
/// sibling edges never observe each other's buffers.
struct Frame {
    g: u32,
    sec_base: u64,
    sec_len: u32,
    /// Next local offset to fetch.
    seq_pos: u32,
    /// Symbols left to consume in this section.
    rem_local: u32,
    /// Path budget left once this section exhausts.
    rem: u32,
    /// Absolute cursor over `[fw_link_base, rv_link_base)`.
    link_pos: u32,
    link_end: u32,
    exp: Expansion,
    /// Pending emission batch: `exp.buf[emit_at..emit_end]` at
    /// `emit_pos`.
    emit_at: usize,
    emit_end: usize,
    emit_pos: u32,
}

/// Lazy k-mer tuple stream over a frozen graph.
///
/// Yields `Err(OutOfMemory)` once and terminates if the expansion
/// frontier overflows its bound. Termination order is observable: for a
/// given origin section, all windows at position 0 precede those at
/// position 1, and windows crossing into different neighbours follow
/// the link-slice order.
pub struct KmerWalker<'a> {
    acv: &'a GraphArchive,
    k: u32,
    /// `2 (k - 1)`, the top slot of a packed window.
    shift: u32,
    /// Frontier bound, re-checked on every expansion.
    max_occ: usize,
    /// Next section id to use as a walk origin.
    next_root: u32,
    /// Forward vertex of the current origin.
    root_gid: u32,
    stack: Vec<Frame>,
    failed: bool,
}

impl<'a> KmerWalker<'a> {
    pub(crate) fn new(acv: &'a GraphArchive) -> Self {
        let k = acv.store.params.seed_len();
        Self {
            acv,
            k: k as u32,
            shift: 2 * (k as u32 - 1),
            max_occ: frontier_bound(k),
            next_root: 0,
            root_gid: 0,
            stack: Vec::new(),
            failed: false,
        }
    }

    /// Begin the walk rooted at the next section, skipping the tail
    /// sentinel. Origins are forward vertices only.
    fn advance_root(&mut self) -> bool {
        if self.next_root >= self.acv.tail_id {
            return false;
        }
        let id = self.next_root;
        self.next_root += 1;
        trace!("walk origin: section {id}");

        let sec = *self.acv.section(id);
        let g = gid(id, 0);
        self.root_gid = g;
        let frame = self.make_frame(g, &sec, sec.len, self.k - 1, Expansion::fresh());
        self.stack.push(frame);
        true
    }

    fn make_frame(&self, g: u32, sec: &Section, rem_local: u32, rem: u32, exp: Expansion) -> Frame {
        Frame {
            g,
            sec_base: sec.base,
            sec_len: sec.len,
            seq_pos: 0,
            rem_local,
            rem,
            link_pos: self.acv.link_base(g),
            link_end: self.acv.link_base(g + 1),
            exp,
            emit_at: 0,
            emit_end: 0,
            emit_pos: 0,
        }
    }
}

impl Iterator for KmerWalker<'_> {
    type Item = Result<KmerTuple, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let depth = self.stack.len();
            if depth == 0 {
                if self.advance_root() {
                    continue;
                }
                return None;
            }
            let top = &mut self.stack[depth - 1];

            // drain the pending emission batch
            if top.emit_at < top.emit_end {
                let kmer = top.exp.buf[top.emit_at];
                top.emit_at += 1;
                return Some(Ok(KmerTuple {
                    kmer,
                    pos: GidPos {
                        gid: self.root_gid,
                        pos: top.emit_pos,
                    },
                }));
            }

            // consume the next symbol of this section
            if top.rem_local > 0 {
                let c = self
                    .acv
                    .base_at(top.sec_base, top.sec_len, gid_dir(top.g), top.seq_pos);
                top.seq_pos += 1;
                top.rem_local -= 1;
                if let Err(e) = top.exp.step(c, self.k, self.shift, self.max_occ) {
                    self.failed = true;
                    return Some(Err(e));
                }
                // a full, gap-free window: emit its expansions
                if top.exp.consumed >= self.k && top.exp.gaps == 0 {
                    top.emit_at = 0;
                    top.emit_end = top.exp.occ;
                    top.emit_pos = top.exp.consumed - self.k;
                }
                continue;
            }

            // section exhausted: descend into the next forward link
            // while budget remains
            if top.rem > 0 && depth < MAX_DEPTH && top.link_pos < top.link_end {
                let to = self.acv.links[top.link_pos as usize];
                top.link_pos += 1;
                let rem = top.rem;
                let exp = top.exp.clone();

                let sec = *self.acv.section(gid_id(to));
                let rem_local = sec.len.min(rem);
                trace!("descend {} -> {to} (budget {rem})", self.root_gid);
                let frame = self.make_frame(to, &sec, rem_local, rem - rem_local, exp);
                self.stack.push(frame);
                continue;
            }

            self.stack.pop();
        }
    }
}

/// Frontier bound: the IUPAC alphabet has no four-way class, so live
/// sets stay within `3^(k/2)` on real data; a floor leaves headroom for
/// short ambiguity runs.
fn frontier_bound(k: usize) -> usize {
    let bound = (3.0f64).powf(k as f64 * 0.5) as usize;
    bound.max(1024)
}
