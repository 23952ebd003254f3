use tempfile::TempDir;

use super::*;
use crate::embeddings::Chunk;

fn chunks(count: usize) -> Vec<Chunk> {
    (0..count)
        .map(|i| Chunk {
            text: format!("chunk number {i}"),
            source: format!("doc{}.txt", i % 3),
            format: ".txt".to_string(),
            chunk_id: i,
        })
        .collect()
}

fn vectors(count: usize, dimension: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|i| (0..dimension).map(|d| (i * dimension + d) as f32).collect())
        .collect()
}

fn snapshot(count: usize) -> Snapshot {
    let index = FlatIndex::build(&vectors(count, 4)).expect("index should build");
    Snapshot::new(index, CorpusStore::new(chunks(count), "test-model", 4))
        .expect("snapshot should be consistent")
}

#[test]
fn save_then_load_preserves_alignment() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let original = snapshot(10);
    original.save(temp_dir.path()).expect("save should succeed");

    let loaded = Snapshot::load(temp_dir.path()).expect("load should succeed");

    assert_eq!(loaded.len(), 10);
    assert_eq!(loaded.dimension(), 4);
    assert_eq!(loaded.index(), original.index());
    assert_eq!(loaded.corpus(), original.corpus());
    assert!(!temp_dir.path().join("index.bin.tmp").exists());
}

#[test]
fn missing_files_name_the_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let error = Snapshot::load(temp_dir.path()).expect_err("empty dir should fail");
    assert!(matches!(&error, RagError::MissingSnapshot { path } if path.ends_with(INDEX_FILE)));
    assert!(error.to_string().contains("docs-rag build"));

    snapshot(3).save(temp_dir.path()).expect("save should succeed");
    fs::remove_file(temp_dir.path().join(CHUNKS_FILE)).expect("should remove chunks");

    let error = Snapshot::load(temp_dir.path()).expect_err("missing chunks should fail");
    assert!(matches!(error, RagError::MissingSnapshot { path } if path.ends_with(CHUNKS_FILE)));
}

#[test]
fn count_mismatch_is_corrupt() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    FlatIndex::build(&vectors(120, 4))
        .expect("index should build")
        .save(&temp_dir.path().join(INDEX_FILE))
        .expect("index save should succeed");
    CorpusStore::new(chunks(119), "test-model", 4)
        .save(&temp_dir.path().join(CHUNKS_FILE))
        .expect("corpus save should succeed");

    let error = Snapshot::load(temp_dir.path()).expect_err("mismatch should fail");

    assert!(matches!(&error, RagError::CorruptSnapshot(_)));
    let message = error.to_string();
    assert!(message.contains("120") && message.contains("119"));
}

#[test]
fn dimension_mismatch_is_corrupt() {
    let index = FlatIndex::build(&vectors(2, 4)).expect("index should build");
    let result = Snapshot::new(index, CorpusStore::new(chunks(2), "test-model", 8));
    assert!(matches!(result, Err(RagError::CorruptSnapshot(msg)) if msg.contains("dimensions")));
}

#[test]
fn empty_corpus_is_corrupt() {
    let index = FlatIndex::build(&vectors(1, 4)).expect("index should build");
    let result = Snapshot::new(index, CorpusStore::new(Vec::new(), "test-model", 4));
    assert!(matches!(result, Err(RagError::CorruptSnapshot(msg)) if msg.contains("empty")));
}

#[test]
fn rebuild_replaces_previous_snapshot() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    snapshot(9).save(temp_dir.path()).expect("first save should succeed");
    snapshot(4).save(temp_dir.path()).expect("second save should succeed");

    let loaded = Snapshot::load(temp_dir.path()).expect("load should succeed");
    assert_eq!(loaded.len(), 4);
}

#[test]
fn consistency_report_describes_state() {
    let original = snapshot(3);
    let report = ConsistencyReport::check(original.index(), original.corpus());
    assert!(report.is_consistent);
    assert!(report.digest_matches);
    assert_eq!(
        report.summary(),
        "3 vectors of 4 dimensions aligned with 3 chunks"
    );

    let unstamped = CorpusStore::new(chunks(3), "m", 4);
    let report = ConsistencyReport::check(original.index(), &unstamped);
    assert!(!report.is_consistent);
    assert_eq!(report.summary(), "index and corpus come from different builds");
}

#[test]
fn index_from_another_build_is_corrupt() {
    let first_dir = TempDir::new().expect("should create temp dir");
    let second_dir = TempDir::new().expect("should create temp dir");
    snapshot(5).save(first_dir.path()).expect("first save should succeed");

    let mut reversed = vectors(5, 4);
    reversed.reverse();
    let other_chunks = (0..5)
        .map(|i| Chunk {
            text: format!("another document, part {i}"),
            source: "other.txt".to_string(),
            format: ".txt".to_string(),
            chunk_id: i,
        })
        .collect();
    let other = Snapshot::new(
        FlatIndex::build(&reversed).expect("index should build"),
        CorpusStore::new(other_chunks, "test-model", 4),
    )
    .expect("snapshot should be consistent");
    other.save(second_dir.path()).expect("second save should succeed");

    fs::copy(
        second_dir.path().join(INDEX_FILE),
        first_dir.path().join(INDEX_FILE),
    )
    .expect("should copy index");

    let error = Snapshot::load(first_dir.path()).expect_err("mixed pair should fail");

    assert!(matches!(&error, RagError::CorruptSnapshot(msg) if msg.contains("different builds")));
}

#[test]
fn failed_save_leaves_no_temporary_files() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::create_dir(temp_dir.path().join("chunks.json.tmp")).expect("should block corpus path");

    let result = snapshot(3).save(temp_dir.path());

    assert!(result.is_err());
    assert!(!temp_dir.path().join("index.bin.tmp").exists());
    assert!(!temp_dir.path().join(INDEX_FILE).exists());
    assert!(!temp_dir.path().join(CHUNKS_FILE).exists());
}
