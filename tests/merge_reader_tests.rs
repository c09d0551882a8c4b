// Merge reader tests
// Global order, completeness, tie-breaks, peek/count behaviour and error paths.

use std::cmp::Ordering;
use std::collections::VecDeque;

use merge_reader::{
    BlockSource, Descending, Error, HeapMergeReader, IterSource, MergeReader, NaturalOrder,
    RingMergeReader,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type VecSource<T> = IterSource<std::vec::IntoIter<T>>;

fn sources<T>(runs: Vec<Vec<T>>) -> Vec<VecSource<T>> {
    runs.into_iter().map(IterSource::new).collect()
}

/// Drain a reader through extract_into, collecting (block, source) pairs.
fn drain<S, C, P>(reader: &mut MergeReader<u64, S, C, P>) -> Vec<(u64, usize)>
where
    S: BlockSource<u64>,
    C: merge_reader::BlockCompare<u64>,
    P: merge_reader::BlockPool<u64>,
{
    let mut out = Vec::new();
    let mut block = 0u64;
    while let Some(source) = reader.extract_into(&mut block).unwrap() {
        out.push((block, source));
    }
    out
}

fn random_runs(rng: &mut StdRng, n: usize, max_len: usize) -> Vec<Vec<u64>> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(0..=max_len);
            let mut run: Vec<u64> = (0..len).map(|_| rng.gen_range(0..500)).collect();
            run.sort();
            run
        })
        .collect()
}

/// Block whose order ignores the tag, so ties are observable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tagged {
    key: u32,
    tag: char,
}

fn by_key(a: &Tagged, b: &Tagged) -> Ordering {
    a.key.cmp(&b.key)
}

fn tagged(key: u32, tag: char) -> Tagged {
    Tagged { key, tag }
}

/// Yields its blocks, then fails instead of ending.
struct FailingSource {
    blocks: VecDeque<u64>,
}

impl BlockSource<u64> for FailingSource {
    fn read_next(&mut self, into: &mut u64) -> merge_reader::Result<bool> {
        match self.blocks.pop_front() {
            Some(block) => {
                *into = block;
                Ok(true)
            }
            None => Err(Error::Corruption("injected read failure".into())),
        }
    }
}

// =============================================================================
// Test 1: Three runs merge into one sorted stream with the right sources
// =============================================================================
#[test]
fn three_runs_merge_in_order() {
    let mut reader: HeapMergeReader<u64, _> = HeapMergeReader::new(
        sources(vec![vec![1, 4, 7], vec![2, 5], vec![3, 6, 8, 9]]),
        NaturalOrder,
    )
    .unwrap();

    let merged = drain(&mut reader);
    let blocks: Vec<u64> = merged.iter().map(|(b, _)| *b).collect();
    let indices: Vec<usize> = merged.iter().map(|(_, s)| *s).collect();

    assert_eq!(blocks, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0, 2, 2]);
    assert_eq!(reader.count(), 9);
    assert!(reader.is_exhausted());
}

// =============================================================================
// Test 2: Random runs → sorted, complete output under both pools
// =============================================================================
#[test]
fn random_runs_merge_sorted_and_complete() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for round in 0..20 {
        let n = 1 + round % 7;
        let runs = random_runs(&mut rng, n, 40);

        let mut expected: Vec<u64> = runs.iter().flatten().copied().collect();
        expected.sort();

        let mut heap: HeapMergeReader<u64, _> =
            HeapMergeReader::new(sources(runs.clone()), NaturalOrder).unwrap();
        let mut ring: RingMergeReader<u64, _> =
            RingMergeReader::new(sources(runs), NaturalOrder).unwrap();

        let from_heap = drain(&mut heap);
        let from_ring = drain(&mut ring);

        let blocks: Vec<u64> = from_heap.iter().map(|(b, _)| *b).collect();
        assert_eq!(blocks, expected, "round {round}");
        assert_eq!(heap.count(), expected.len() as u64);
        assert_eq!(from_heap, from_ring, "pools must not change the merge");
    }
}

// =============================================================================
// Test 3: Every emitted block really came from the source it is attributed to
// =============================================================================
#[test]
fn source_indices_match_origin() {
    // Encode the source in the block: value * 10 + source.
    let runs: Vec<Vec<u64>> = (0..4u64)
        .map(|s| (0..25u64).map(|v| (v * 3 + s % 2) * 10 + s).collect())
        .collect();

    let mut reader: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(runs), NaturalOrder).unwrap();

    let merged = drain(&mut reader);
    assert_eq!(merged.len(), 100);
    for (block, source) in merged {
        assert_eq!(block % 10, source as u64);
    }
}

// =============================================================================
// Test 4: Equal blocks at construction come out in source order
// =============================================================================
#[test]
fn ties_at_construction_follow_source_order() {
    let runs = vec![
        vec![tagged(1, 'a'), tagged(2, 'b')],
        vec![tagged(1, 'c'), tagged(2, 'd')],
        vec![tagged(1, 'e')],
    ];
    let mut reader: HeapMergeReader<Tagged, _, _> =
        HeapMergeReader::new(sources(runs), by_key).unwrap();

    let merged: Vec<(char, usize)> = reader
        .blocks()
        .map(|r| r.unwrap())
        .map(|(block, source)| (block.tag, source))
        .collect();

    assert_eq!(
        merged,
        vec![('a', 0), ('c', 1), ('e', 2), ('b', 0), ('d', 1)]
    );
}

// =============================================================================
// Test 5: Later ties follow refill order, not source order
// =============================================================================
// Source 2 buffers its 5 at construction; sources 0 and 1 only reach 5 after
// refills, so source 2's block was registered first and wins the tie.
#[test]
fn ties_after_refill_follow_registration_order() {
    let runs = vec![
        vec![tagged(1, 'a'), tagged(5, 'b')],
        vec![tagged(2, 'c'), tagged(5, 'd')],
        vec![tagged(5, 'e')],
    ];
    let mut reader: HeapMergeReader<Tagged, _, _> =
        HeapMergeReader::new(sources(runs), by_key).unwrap();

    let mut out = Tagged::default();
    let mut merged = Vec::new();
    while let Some(source) = reader.extract_into(&mut out).unwrap() {
        merged.push((out.tag, source));
    }

    assert_eq!(
        merged,
        vec![('a', 0), ('c', 1), ('e', 2), ('b', 0), ('d', 1)]
    );
}

// =============================================================================
// Test 6: Same construction + extraction sequence → identical output
// =============================================================================
#[test]
fn merge_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let runs: Vec<Vec<u64>> = (0..5)
        .map(|_| {
            // Few distinct values → many ties.
            let mut run: Vec<u64> = (0..30).map(|_| rng.gen_range(0..4)).collect();
            run.sort();
            run
        })
        .collect();

    let mut first: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(runs.clone()), NaturalOrder).unwrap();
    let mut second: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(runs), NaturalOrder).unwrap();

    assert_eq!(drain(&mut first), drain(&mut second));
}

// =============================================================================
// Test 7: Peek is idempotent and does not touch the count
// =============================================================================
#[test]
fn peek_has_no_side_effects() {
    let mut reader: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(vec![vec![3, 8], vec![5]]), NaturalOrder).unwrap();

    for _ in 0..5 {
        assert_eq!(reader.peek(), Some(&3));
    }
    assert_eq!(reader.count(), 0);

    let (block, source) = reader.extract_owned().unwrap().unwrap();
    assert_eq!((*block, source), (3, 0));
    assert_eq!(reader.count(), 1);

    assert_eq!(reader.peek(), Some(&5));
    assert_eq!(reader.peek(), Some(&5));
    assert_eq!(reader.count(), 1);
}

// =============================================================================
// Test 8: Count grows by exactly one per extraction, stops at exhaustion
// =============================================================================
#[test]
fn count_tracks_extractions() {
    let mut reader: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(vec![vec![1, 2, 3], vec![4, 5]]), NaturalOrder).unwrap();

    let mut block = 0;
    for expected in 1..=5 {
        reader.peek();
        assert!(reader.extract_into(&mut block).unwrap().is_some());
        assert_eq!(reader.count(), expected);
    }

    block = 77;
    assert_eq!(reader.extract_into(&mut block).unwrap(), None);
    assert_eq!(block, 77, "output must be untouched at exhaustion");
    assert!(reader.extract_owned().unwrap().is_none());
    assert_eq!(reader.peek(), None);
    assert_eq!(reader.count(), 5);
}

// =============================================================================
// Test 9: Empty sources are skipped; all-empty input is exhausted at once
// =============================================================================
#[test]
fn empty_sources_are_skipped() {
    let mut reader: HeapMergeReader<u64, _> = HeapMergeReader::new(
        sources(vec![vec![], vec![2, 4], vec![], vec![1]]),
        NaturalOrder,
    )
    .unwrap();

    assert_eq!(reader.num_sources(), 4);
    assert_eq!(reader.pending(), 2);
    assert_eq!(drain(&mut reader), vec![(1, 3), (2, 1), (4, 1)]);

    let mut empty: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(vec![vec![], vec![]]), NaturalOrder).unwrap();
    assert!(empty.is_exhausted());
    assert_eq!(empty.peek(), None);
    assert!(empty.extract_owned().unwrap().is_none());
}

// =============================================================================
// Test 10: No sources → NoSources
// =============================================================================
#[test]
fn no_sources_is_an_error() {
    let result: merge_reader::Result<HeapMergeReader<u64, VecSource<u64>>> =
        HeapMergeReader::new(Vec::new(), NaturalOrder);
    assert!(matches!(result, Err(Error::NoSources)));
}

// =============================================================================
// Test 11: A source failing its first read fails construction with its index
// =============================================================================
#[test]
fn first_read_failure_fails_construction() {
    let failing = vec![
        Box::new(IterSource::new(vec![1u64, 2])) as Box<dyn BlockSource<u64>>,
        Box::new(FailingSource {
            blocks: VecDeque::new(),
        }),
    ];

    let result: merge_reader::Result<HeapMergeReader<u64, _>> =
        HeapMergeReader::new(failing, NaturalOrder);
    match result {
        Err(Error::Open {
            index: 1,
            path: None,
            source,
        }) => assert!(matches!(*source, Error::Corruption(_))),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction should fail"),
    }
}

// =============================================================================
// Test 12: Refill failure is returned, the popped block is not lost
// =============================================================================
#[test]
fn refill_failure_keeps_popped_block() {
    let inputs = vec![
        Box::new(FailingSource {
            blocks: VecDeque::from(vec![1, 3]),
        }) as Box<dyn BlockSource<u64>>,
        Box::new(IterSource::new(vec![2u64, 4, 6])),
    ];
    let mut reader: HeapMergeReader<u64, _> =
        HeapMergeReader::new(inputs, NaturalOrder).unwrap();

    let mut block = 0;
    assert_eq!(reader.extract_into(&mut block).unwrap(), Some(0));
    assert_eq!(block, 1);
    assert_eq!(reader.extract_into(&mut block).unwrap(), Some(1));
    assert_eq!(block, 2);

    // Popping 3 triggers a refill of source 0, which fails.
    let err = reader.extract_into(&mut block).unwrap_err();
    assert!(matches!(err, Error::Corruption(_)));
    assert_eq!(reader.count(), 2);
    assert_eq!(reader.peek(), Some(&3));

    // The failed source is closed: no retry, no second error.
    assert_eq!(drain(&mut reader), vec![(3, 0), (4, 1), (6, 1)]);
    assert_eq!(reader.count(), 5);
}

// =============================================================================
// Test 13: Closure and Descending comparators
// =============================================================================
#[test]
fn custom_orderings() {
    let mut descending: HeapMergeReader<u64, _, _> =
        HeapMergeReader::new(sources(vec![vec![9, 4, 1], vec![8, 2]]), Descending).unwrap();
    let blocks: Vec<u64> = drain(&mut descending).into_iter().map(|(b, _)| b).collect();
    assert_eq!(blocks, vec![9, 8, 4, 2, 1]);

    // Runs sorted by last decimal digit.
    let by_digit = |a: &u64, b: &u64| (a % 10).cmp(&(b % 10));
    let mut reader: HeapMergeReader<u64, _, _> =
        HeapMergeReader::new(sources(vec![vec![21, 13, 55], vec![30, 42]]), by_digit).unwrap();
    let blocks: Vec<u64> = drain(&mut reader).into_iter().map(|(b, _)| b).collect();
    assert_eq!(blocks, vec![30, 21, 42, 13, 55]);
}

// =============================================================================
// Test 14: Heap pool hands out boxes that outlive further extractions
// =============================================================================
#[test]
fn heap_pool_owned_blocks_are_permanent() {
    let mut reader: HeapMergeReader<u64, _> = HeapMergeReader::new(
        sources(vec![vec![1, 3, 5, 7], vec![2, 4, 6, 8]]),
        NaturalOrder,
    )
    .unwrap();

    let mut owned = Vec::new();
    while let Some((block, source)) = reader.extract_owned().unwrap() {
        owned.push((block, source));
    }
    drop(reader);

    let blocks: Vec<u64> = owned.iter().map(|(b, _)| **b).collect();
    assert_eq!(blocks, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

// =============================================================================
// Test 15: Pool holds exactly one cell per buffered block
// =============================================================================
#[test]
fn pool_cells_match_buffered_blocks() {
    let runs = vec![vec![1u64, 2, 3], vec![], vec![4], vec![5, 6]];

    let mut heap: HeapMergeReader<u64, _> =
        HeapMergeReader::new(sources(runs.clone()), NaturalOrder).unwrap();
    let mut ring: RingMergeReader<u64, _> =
        RingMergeReader::new(sources(runs), NaturalOrder).unwrap();

    let mut block = 0;
    loop {
        assert_eq!(heap.pool().outstanding(), heap.pending());
        assert_eq!(ring.pool().outstanding(), ring.pending());
        let from_heap = heap.extract_into(&mut block).unwrap();
        let from_ring = ring.extract_owned().unwrap().map(|(_, s)| s);
        assert_eq!(from_heap, from_ring);
        if from_heap.is_none() {
            break;
        }
    }
    assert_eq!(heap.pool().outstanding(), 0);
    assert_eq!(ring.pool().outstanding(), 0);
}

// =============================================================================
// Test 16: Dropping a reader with live sources is fine
// =============================================================================
#[test]
fn drop_with_live_sources() {
    let mut reader: RingMergeReader<u64, _> =
        RingMergeReader::new(sources(vec![vec![1, 2, 3], vec![4, 5, 6]]), NaturalOrder)
            .unwrap();
    let mut block = 0;
    reader.extract_into(&mut block).unwrap();
    assert_eq!(reader.pending(), 2);
    drop(reader);
}

// =============================================================================
// Test 17: blocks() iterator yields owned copies with source indices
// =============================================================================
#[test]
fn blocks_iterator_collects_remaining() {
    let mut reader: RingMergeReader<String, _> = RingMergeReader::new(
        sources(vec![
            vec!["apple".to_string(), "cherry".to_string()],
            vec!["banana".to_string()],
        ]),
        NaturalOrder,
    )
    .unwrap();

    let first = reader.extract_owned().unwrap().unwrap();
    assert_eq!(reader.resolve(&first.0), "apple");

    let rest: Vec<(String, usize)> = reader.blocks().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        rest,
        vec![("banana".to_string(), 1), ("cherry".to_string(), 0)]
    );
    assert_eq!(reader.count(), 3);
}
