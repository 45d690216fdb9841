use graphseed::encode::{POPCNT_4BIT, encode_4bit, kmer_mask, pack_query};
use graphseed::{Dir, GraphPool, Params};
use proptest::prelude::*;

const IUPAC: &[u8] = b"ACGTRYSWKMBDHVN";

fn single_segment(seq: &[u8], k: usize) -> GraphPool {
    let mut p =
        GraphPool::new(Params::default().with_seed_len(k).with_num_threads(1)).unwrap();
    p.append_segment(b"sec0", seq).unwrap();
    p
}

/// Oracle: the expansion cardinality of every k-window of a lone
/// segment, summed. A window holding a gap class contributes nothing.
fn naive_tuple_count(seq: &[u8], k: usize) -> u64 {
    if seq.len() < k {
        return 0;
    }
    seq.windows(k)
        .map(|w| {
            w.iter()
                .map(|&b| POPCNT_4BIT[encode_4bit(b) as usize] as u64)
                .product::<u64>()
        })
        .sum()
}

proptest! {
    // Invariant: iteration emits exactly the per-window expansion
    // cardinalities.
    #[test]
    fn prop_tuple_completeness(
        k in 2usize..=6,
        seq in prop::collection::vec(prop::sample::select(IUPAC.to_vec()), 3..48)
    ) {
        let tuples = single_segment(&seq, k)
            .freeze().unwrap()
            .kmers()
            .collect::<Result<Vec<_>, _>>().unwrap();
        prop_assert_eq!(tuples.len() as u64, naive_tuple_count(&seq, k));
        for t in &tuples {
            prop_assert_eq!(t.kmer & !kmer_mask(k), 0);
            prop_assert_eq!(t.pos.gid, 0);
        }
    }

    // Every bucket slice is recoverable and they partition the table.
    #[test]
    fn prop_buckets_partition_the_table(
        k in 2usize..=5,
        seq in prop::collection::vec(prop::sample::select(IUPAC.to_vec()), 3..40)
    ) {
        let total = naive_tuple_count(&seq, k) as usize;
        let idx = single_segment(&seq, k).freeze().unwrap().build_index().unwrap();

        let mut seen = 0usize;
        for v in 0..1u64 << (2 * k) {
            seen += idx.match_packed(v).len();
        }
        prop_assert_eq!(seen, total);
    }

    // ASCII and pre-packed lookups agree on unambiguous queries.
    #[test]
    fn prop_match_ascii_equals_match_packed(
        k in 2usize..=6,
        seq in prop::collection::vec(prop::sample::select(IUPAC.to_vec()), 6..40),
        query in prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 6)
    ) {
        let idx = single_segment(&seq, k).freeze().unwrap().build_index().unwrap();
        let by_ascii = idx.match_ascii(&query);
        let by_packed = idx.match_packed(pack_query(&query, k));
        prop_assert_eq!(by_ascii, by_packed);
        // idempotent: same slice both times
        prop_assert_eq!(by_ascii.as_ptr(), idx.match_ascii(&query).as_ptr());
    }

    // freeze → melt restores the link multiset, duals included.
    #[test]
    fn prop_melt_round_trips_links(
        k in 2usize..=4,
        links in prop::collection::vec((0u8..4, any::<bool>(), 0u8..4, any::<bool>()), 0..12)
    ) {
        let mut p = GraphPool::new(
            Params::default().with_seed_len(k).with_num_threads(1)
        ).unwrap();
        let names: [&[u8]; 4] = [b"s0", b"s1", b"s2", b"s3"];
        for (i, n) in names.iter().enumerate() {
            p.append_segment(n, if i % 2 == 0 { b"ACGT" } else { b"GGTA" }).unwrap();
        }
        let dir = |rev| if rev { Dir::Rev } else { Dir::Fwd };
        for &(s, sd, d, dd) in &links {
            p.append_link(names[s as usize], dir(sd), names[d as usize], dir(dd)).unwrap();
        }

        let mut want = p.links().to_vec();
        let melted = p.freeze().unwrap().melt();
        let mut got = melted.links().to_vec();
        want.sort_by_key(|l| (l.from, l.to));
        got.sort_by_key(|l| (l.from, l.to));
        prop_assert_eq!(want, got);
    }
}
