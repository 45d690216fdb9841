//! Sort-by-key over a leading unsigned key: a stable LSD radix sort for
//! single-threaded use, a scoped rayon pool otherwise.

use rayon::prelude::*;

use crate::error::Error;
use crate::graph::{KmerTuple, LinkPair};

/// Element types sortable by a leading unsigned key.
pub(crate) trait SortKey: Copy + Default + Send {
    fn key(&self) -> u64;
}

impl SortKey for LinkPair {
    #[inline]
    fn key(&self) -> u64 {
        u64::from(self.from)
    }
}

impl SortKey for KmerTuple {
    #[inline]
    fn key(&self) -> u64 {
        self.kmer
    }
}

/// Stable sort of `v` by ascending key. `key_width` is the key's byte
/// width (the radix pass count). `threads == 1` sorts on the calling
/// thread, `threads == 0` uses the default pool, and any other value
/// runs inside a dedicated pool of that size; a pool that cannot be
/// built reports `SortFailure`.
pub(crate) fn sort_by_key<T: SortKey>(
    v: &mut [T],
    key_width: usize,
    threads: usize,
) -> Result<(), Error> {
    match threads {
        1 => {
            radix_sort_by_key(v, key_width);
            Ok(())
        }
        0 => {
            v.par_sort_by_key(|e| e.key());
            Ok(())
        }
        n => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|_| Error::SortFailure)?;
            pool.install(|| v.par_sort_by_key(|e: &T| e.key()));
            Ok(())
        }
    }
}

/// 8-bit LSD counting passes, stable. Scratch is allocated once and
/// reused across passes.
fn radix_sort_by_key<T: SortKey>(v: &mut [T], key_width: usize) {
    let n = v.len();
    if n <= 1 {
        return;
    }

    let mut tmp = vec![T::default(); n];
    for pass in 0..key_width {
        let shift = pass * 8;
        let mut counts = [0usize; 256];

        for e in v.iter() {
            counts[((e.key() >> shift) & 0xff) as usize] += 1;
        }

        // prefix sums -> scatter positions
        let mut sum = 0usize;
        for c in counts.iter_mut() {
            let t = *c;
            *c = sum;
            sum += t;
        }

        for i in 0..n {
            let b = ((v[i].key() >> shift) & 0xff) as usize;
            tmp[counts[b]] = v[i];
            counts[b] += 1;
        }
        v.copy_from_slice(&tmp);
    }
}
