// In-process stand-ins for the embedding server and the chat model

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::database::{CorpusStore, FlatIndex, Snapshot};
use crate::embeddings::{Chunk, Embedder};
use crate::generation::Generator;
use crate::{RagError, Result};

/// Bag-of-words embedder: each word adds one to a hashed bucket
pub(crate) struct KeywordEmbedder {
    dimension: usize,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) % self.dimension as u64;
            vector[bucket as usize] += 1.0;
        }
        vector
    }
}

impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Returns a canned answer and records every prompt it receives
pub(crate) struct RecordingGenerator {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub(crate) fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log should not be poisoned").clone()
    }
}

impl Generator for RecordingGenerator {
    fn model_name(&self) -> &str {
        "recording-test"
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log should not be poisoned")
            .push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

pub(crate) struct FailingGenerator;

impl Generator for FailingGenerator {
    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagError::Generation("provider unavailable".to_string()))
    }
}

pub(crate) fn chunk(source: &str, text: &str, chunk_id: usize) -> Chunk {
    Chunk {
        text: text.to_string(),
        source: source.to_string(),
        format: ".txt".to_string(),
        chunk_id,
    }
}

/// Snapshot of `(source, text)` pairs embedded with `embedder`
pub(crate) fn snapshot_of(embedder: &KeywordEmbedder, docs: &[(&str, &str)]) -> Snapshot {
    let chunks: Vec<Chunk> = docs
        .iter()
        .enumerate()
        .map(|(i, (source, text))| chunk(source, text, i))
        .collect();
    let vectors: Vec<Vec<f32>> = chunks.iter().map(|c| embedder.vectorize(&c.text)).collect();
    let index = FlatIndex::build(&vectors).expect("test index should build");
    Snapshot::new(
        index,
        CorpusStore::new(chunks, embedder.model_name(), embedder.dimension),
    )
    .expect("test snapshot should be consistent")
}

/// A well-formed PDF whose only page has no `/Resources` entry
pub(crate) fn pdf_without_resources() -> Vec<u8> {
    use std::fmt::Write as _;

    let content = "BT /F1 12 Tf 72 712 Td (Hello world) Tj ET";
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{object}\nendobj\n", i + 1);
    }
    let xref = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    );
    pdf.into_bytes()
}
