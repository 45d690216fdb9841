//! Lifecycle, accessor and matcher behavior over small literal graphs.

use graphseed::{
    Dir, Error, GidPos, GraphPool, IndexMode, Params, SeedGraph, SeqFormat, CopyMode, gid_id,
};

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pool(k: usize) -> GraphPool {
    GraphPool::new(Params::default().with_seed_len(k).with_num_threads(1)).unwrap()
}

/// The three-section reference graph: section 2 is mentioned by a link
/// before its segment arrives.
fn reference_pool() -> GraphPool {
    let mut p = pool(3);
    p.append_segment(b"sec0", b"GGRA").unwrap();
    p.append_segment(b"sec1", b"MGGG").unwrap();
    p.append_link(b"sec0", Dir::Fwd, b"sec1", Dir::Fwd).unwrap();
    p.append_link(b"sec1", Dir::Fwd, b"sec2", Dir::Fwd).unwrap();
    p.append_segment(b"sec2", b"ACVVGTGT").unwrap();
    p.append_link(b"sec0", Dir::Fwd, b"sec2", Dir::Fwd).unwrap();
    p
}

fn positions(hits: &[GidPos]) -> Vec<(u32, u32)> {
    hits.iter().map(|h| (h.gid, h.pos)).collect()
}

#[test]
fn rejects_bad_params() {
    log_init();
    assert!(matches!(
        GraphPool::new(Params::default().with_seed_len(0)),
        Err(Error::BadParam(_))
    ));
    assert!(matches!(
        GraphPool::new(Params::default().with_seed_len(33)),
        Err(Error::BadParam(_))
    ));
    assert!(matches!(
        GraphPool::new(Params::default().with_copy_mode(CopyMode::NoCopy)),
        Err(Error::BadParam(_))
    ));
    assert!(matches!(
        GraphPool::new(Params::default().with_seq_format(SeqFormat::FourBit)),
        Err(Error::BadParam(_))
    ));
    // the supported pre-encoded cell
    assert!(
        GraphPool::new(
            Params::default()
                .with_seq_format(SeqFormat::FourBit)
                .with_copy_mode(CopyMode::NoCopy)
        )
        .is_ok()
    );
}

#[test]
fn sections_and_names_after_freeze() {
    log_init();
    let acv = reference_pool().freeze().unwrap();

    // ids were handed out in first-mention order
    let s0 = acv.get_section(0).unwrap();
    assert_eq!((s0.id, s0.len, s0.base), (0, 4, 0));
    let s1 = acv.get_section(1).unwrap();
    assert_eq!((s1.id, s1.len, s1.base), (1, 4, 4));
    let s2 = acv.get_section(2).unwrap();
    assert_eq!((s2.id, s2.len, s2.base), (2, 8, 8));

    assert_eq!(acv.get_name(0), Some(&b"sec0"[..]));
    assert_eq!(acv.get_name(1), Some(&b"sec1"[..]));
    assert_eq!(acv.get_name(2), Some(&b"sec2"[..]));
    assert_eq!(acv.get_name(99), None);

    assert_eq!(acv.total_len(), 16);
    assert!(!acv.seq().is_empty());
    // three sections plus the tail sentinel
    assert_eq!(acv.section_count(), 4);
}

#[test]
fn matches_reference_graph() {
    log_init();
    let idx = reference_pool().freeze().unwrap().build_index().unwrap();

    // unambiguous hit inside section 2
    let hits = idx.match_ascii(b"GTG");
    assert_eq!(positions(hits), vec![(4, 4)]);
    let sec = idx.section_of(hits[0].gid).unwrap();
    assert_eq!((sec.id, sec.len, sec.base), (2, 8, 8));

    // GGG arises from GGR, from MGGG and from the VVG window
    assert_eq!(
        positions(idx.match_ascii(b"GGG")),
        vec![(0, 0), (2, 1), (4, 2)]
    );

    // both expansions of the MGG window survive the collapse
    assert_eq!(positions(idx.match_ascii(b"AGG")), vec![(2, 0), (4, 2)]);

    // windows crossing section boundaries are attributed to the origin
    assert_eq!(
        positions(idx.match_ascii(b"GGA")),
        vec![(0, 0), (0, 1), (2, 2)]
    );

    assert!(idx.match_ascii(b"TTT").is_empty());

    // a query shorter than the seed length matches nothing
    assert!(idx.match_ascii(b"GT").is_empty());
    assert!(idx.match_ascii(b"").is_empty());
}

#[test]
fn match_is_idempotent_and_packed_equivalent() {
    log_init();
    let idx = reference_pool().freeze().unwrap().build_index().unwrap();

    let a = idx.match_ascii(b"GTG");
    let b = idx.match_ascii(b"GTG");
    assert_eq!(a.as_ptr(), b.as_ptr());
    assert_eq!(a.len(), b.len());

    let packed = graphseed::encode::pack_query(b"GTG", 3);
    assert_eq!(a, idx.match_packed(packed));
}

#[test]
fn no_tuple_names_the_sentinel() {
    log_init();
    let acv = reference_pool().freeze().unwrap();
    let sentinel = acv.section_count() - 1;
    for t in acv.kmers() {
        let t = t.unwrap();
        assert!(gid_id(t.pos.gid) < sentinel);
    }
}

#[test]
fn melt_restores_the_link_multiset() {
    log_init();
    let p = reference_pool();
    let before_links = p.links().to_vec();
    let before_sections = p.section_count();

    let melted = p.freeze().unwrap().melt();
    assert_eq!(melted.section_count(), before_sections);

    let mut want = before_links;
    let mut got = melted.links().to_vec();
    want.sort_by_key(|l| (l.from, l.to));
    got.sort_by_key(|l| (l.from, l.to));
    assert_eq!(want, got);

    // a melted pool freezes and indexes again
    let idx = melted.freeze().unwrap().build_index().unwrap();
    assert_eq!(positions(idx.match_ascii(b"GTG")), vec![(4, 4)]);
}

#[test]
fn empty_pool_freezes_to_sentinel_only() {
    log_init();
    let acv = pool(2).freeze().unwrap();
    assert_eq!(acv.section_count(), 1);
    assert_eq!(acv.kmers().count(), 0);

    let idx = acv.build_index().unwrap();
    for v in 0..16u64 {
        assert!(idx.match_packed(v).is_empty());
    }
}

#[test]
fn link_to_missing_segment_is_an_empty_section() {
    log_init();
    let mut p = pool(2);
    p.append_segment(b"a", b"AC").unwrap();
    p.append_link(b"a", Dir::Fwd, b"ghost", Dir::Fwd).unwrap();

    let idx = p.freeze().unwrap().build_index().unwrap();
    assert_eq!(idx.get_section(1).unwrap().len, 0);
    assert_eq!(positions(idx.match_ascii(b"AC")), vec![(0, 0)]);
}

#[test]
fn reappending_a_name_overwrites_the_record() {
    log_init();
    let mut p = pool(2);
    let first = p.append_segment(b"s", b"AC").unwrap();
    let second = p.append_segment(b"s", b"GTT").unwrap();
    assert_eq!(first, second);

    let acv = p.freeze().unwrap();
    let s = acv.get_section(first).unwrap();
    assert_eq!((s.len, s.base), (3, 2));
}

#[test]
fn iter_only_mode_refuses_the_match_table() {
    log_init();
    let params = Params::default()
        .with_seed_len(3)
        .with_index_mode(IndexMode::IterOnly)
        .with_num_threads(1);
    let mut p = GraphPool::new(params).unwrap();
    p.append_segment(b"s", b"ACGT").unwrap();

    let acv = p.freeze().unwrap();
    assert_eq!(acv.kmers().count(), 2);
    assert!(matches!(acv.build_index(), Err(Error::BadParam(_))));
}

#[test]
fn four_bit_input_is_adopted_verbatim() {
    log_init();
    let params = Params::default()
        .with_seed_len(2)
        .with_seq_format(SeqFormat::FourBit)
        .with_copy_mode(CopyMode::NoCopy)
        .with_num_threads(1);
    let mut p = GraphPool::new(params).unwrap();
    // ACGT as 4-bit classes
    p.append_segment(b"s", &[0x1, 0x2, 0x4, 0x8]).unwrap();

    let idx = p.freeze().unwrap().build_index().unwrap();
    assert_eq!(positions(idx.match_ascii(b"CG")), vec![(0, 1)]);
}

#[test]
fn facade_tracks_the_lifecycle() {
    log_init();
    let mut h = SeedGraph::new(Params::default().with_seed_len(3).with_num_threads(1)).unwrap();
    h.append_segment(b"sec0", b"ACGT").unwrap();
    h.append_snp(b"sec0", 1, b'G').unwrap();
    h.split_section(b"sec0", 2).unwrap();

    let mut h = h.freeze().unwrap();
    assert!(matches!(
        h.append_segment(b"late", b"AC"),
        Err(Error::InvalidState { expected: "pool" })
    ));
    assert!(matches!(
        h.match_ascii(b"ACG"),
        Err(Error::InvalidState { expected: "index" })
    ));
    assert_eq!(h.kmers().unwrap().count(), 2);
    assert_eq!(h.total_len().unwrap(), 4);
    assert_eq!(h.seq().unwrap().len(), 4);
    assert_eq!(h.get_section(0).unwrap().unwrap().len, 4);
    assert_eq!(h.get_name(0).unwrap(), Some(&b"sec0"[..]));

    h = h.build_index().unwrap();
    assert_eq!(positions(h.match_ascii(b"ACG").unwrap()), vec![(0, 0)]);
    assert_eq!(
        h.match_packed(graphseed::encode::pack_query(b"CGT", 3))
            .unwrap()
            .len(),
        1
    );

    h = h.disable_index().unwrap();
    h = h.melt().unwrap();
    assert!(matches!(&h, SeedGraph::Pool(_)));
    assert_eq!(h.section_count(), 1);

    // transitions reject mismatched tags
    let h = h.melt();
    assert!(matches!(h, Err(Error::InvalidState { expected: "archive" })));
}
