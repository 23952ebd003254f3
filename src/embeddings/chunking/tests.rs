use super::*;

fn blob(filename: &str, text: &str) -> DocumentBlob {
    DocumentBlob {
        filename: filename.to_string(),
        text: text.to_string(),
        format: ".txt".to_string(),
    }
}

fn expected_window_count(len: usize, chunk_size: usize, overlap: usize) -> usize {
    len.saturating_sub(overlap).div_ceil(chunk_size - overlap)
}

#[test]
fn syllabus_splits_into_two_chunks() {
    let docs = vec![blob(
        "syllabus.txt",
        "Course starts Monday. Office hours Friday 3pm.",
    )];
    let config = ChunkingConfig::new(40, 5);

    let chunks = split(&docs, &config).expect("split should succeed");

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.source == "syllabus.txt"));
    assert_eq!(chunks[0].text, "Course starts Monday. Office hours Frida");
    assert_eq!(chunks[1].text, "Friday 3pm.");
}

#[test]
fn raw_window_count_matches_formula() {
    let text = "abcdefghijklmnopqrstuvwxyz0123456789".repeat(7);
    for chunk_size in 1..30 {
        for overlap in 0..chunk_size {
            for len in [0, 1, 5, 29, 30, 31, 100, text.len()] {
                let slice = text.get(..len).expect("ascii slice");
                let config = ChunkingConfig::new(chunk_size, overlap);
                assert_eq!(
                    windows(slice, &config).len(),
                    expected_window_count(len, chunk_size, overlap),
                    "len={len} chunk_size={chunk_size} overlap={overlap}"
                );
            }
        }
    }
}

#[test]
fn windows_overlap_by_configured_amount() {
    let text = "0123456789abcdefghij";
    let config = ChunkingConfig::new(8, 3);

    let windows = windows(text, &config);

    assert_eq!(windows, vec!["01234567", "56789abc", "abcdefgh", "fghij"]);
}

#[test]
fn windows_respect_multibyte_characters() {
    let text = "ñandú café über straße ".repeat(10);
    let config = ChunkingConfig::new(7, 2);

    let windows = windows(&text, &config);

    assert!(!windows.is_empty());
    assert!(windows.iter().all(|w| w.chars().count() <= 7));
    assert_eq!(windows[0], "ñandú c");
}

#[test]
fn short_trailing_windows_are_discarded() {
    let text = "x".repeat(505);
    let docs = vec![blob("a.txt", &text)];

    // Second window holds 55 chars, third would be redundant overlap only
    let chunks = split(&docs, &ChunkingConfig::default()).expect("split should succeed");
    assert_eq!(chunks.len(), 2);

    let docs = vec![blob("a.txt", &"x".repeat(500))];
    let chunks = split(&docs, &ChunkingConfig::default()).expect("split should succeed");
    assert_eq!(chunks.len(), 1);
}

#[test]
fn explicit_minimum_overrides_default_threshold() {
    let docs = vec![blob("a.txt", "short text")];
    let config = ChunkingConfig {
        chunk_size: 40,
        overlap: 0,
        min_chunk_chars: Some(20),
    };

    let chunks = split(&docs, &config).expect("split should succeed");

    assert!(chunks.is_empty());
}

#[test]
fn chunk_ids_are_global_and_sequential() {
    let docs = vec![
        blob("one.txt", &"a".repeat(120)),
        blob("two.txt", &"b".repeat(120)),
    ];
    let config = ChunkingConfig::new(50, 10);

    let chunks = split(&docs, &config).expect("split should succeed");

    assert_eq!(chunks.len(), 6);
    for (position, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_id, position);
    }
    assert_eq!(chunks[2].source, "one.txt");
    assert_eq!(chunks[3].source, "two.txt");
}

#[test]
fn splitting_is_deterministic() {
    let docs = vec![
        blob("one.txt", &"lorem ipsum dolor sit amet ".repeat(40)),
        blob("two.txt", &"consectetur adipiscing elit ".repeat(25)),
    ];
    let config = ChunkingConfig::new(120, 20);

    let first = split(&docs, &config).expect("split should succeed");
    let second = split(&docs, &config).expect("split should succeed");

    assert_eq!(first, second);
}

#[test]
fn overlap_equal_to_chunk_size_is_rejected() {
    let docs = vec![blob("a.txt", "some text")];
    let config = ChunkingConfig::new(10, 10);

    let result = split(&docs, &config);

    assert!(matches!(result, Err(RagError::Config(_))));
}

#[test]
fn zero_chunk_size_is_rejected() {
    let config = ChunkingConfig::new(0, 0);
    assert!(matches!(config.validate(), Err(RagError::Config(_))));
    assert!(windows("abc", &config).is_empty());
}

#[test]
fn default_threshold_is_tenth_of_chunk_size() {
    assert_eq!(ChunkingConfig::default().discard_threshold(), 50);
    assert_eq!(ChunkingConfig::new(40, 5).discard_threshold(), 4);
}
