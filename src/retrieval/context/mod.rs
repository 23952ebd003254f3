
use itertools::Itertools;

use super::RetrievalResult;

/// Retrieved text labeled by source, ready to ground a prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    pub context: String,
    /// Distinct source names in order of first appearance
    pub sources: Vec<String>,
}

impl AssembledContext {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

#[inline]
pub fn assemble(results: &[RetrievalResult]) -> AssembledContext {
    let context = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[Fragment {} from {}]:\n{}",
                i + 1,
                result.chunk.source,
                result.chunk.text
            )
        })
        .join("\n\n");

    let sources = results
        .iter()
        .map(|result| result.chunk.source.clone())
        .unique()
        .collect();

    AssembledContext { context, sources }
}

/// Prompt asking the model to answer strictly from `context`
#[inline]
pub fn build_prompt(question: &str, context: &AssembledContext) -> String {
    let mut prompt = String::from(
        "You are an assistant that answers questions using only the document \
         fragments provided below. Do not use outside knowledge. When you use \
         information from a fragment, cite the name of the document it came from.\n\n",
    );

    if context.is_empty() {
        prompt.push_str(
            "No relevant fragments were found in the indexed documents. State that \
             the indexed documents do not contain enough information to answer the \
             question.\n\n",
        );
    } else {
        prompt.push_str(
            "If the fragments do not contain enough information to answer, say so \
             plainly instead of guessing.\n\nDocument fragments:\n",
        );
        prompt.push_str(&context.context);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Question: ");
    prompt.push_str(question.trim());
    prompt.push_str("\n\nAnswer:");
    prompt
}
