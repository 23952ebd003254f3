use criterion::{Criterion, criterion_group, criterion_main};
use docs_rag::embeddings::{ChunkingConfig, split};
use docs_rag::extract::DocumentBlob;
use std::hint::black_box;

fn lecture_notes(paragraphs: usize) -> DocumentBlob {
    let text = (0..paragraphs)
        .map(|i| {
            format!(
                "Lecture {i}: ownership moves values between bindings, borrows lend them \
                 without transferring responsibility, and lifetimes bound how long a \
                 borrow stays valid. Exercises for week {i} are due on Friday.\n"
            )
        })
        .collect::<String>();
    DocumentBlob {
        filename: "notes.md".to_string(),
        text,
        format: ".md".to_string(),
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let documents = vec![lecture_notes(2_000)];
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| split(black_box(&documents), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
