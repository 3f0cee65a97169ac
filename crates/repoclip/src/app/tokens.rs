//! Token estimation for the compiled document.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use tiktoken_rs::{CoreBPE, cl100k_base};

static CL100K: Lazy<Option<Mutex<CoreBPE>>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(Mutex::new(bpe)),
    Err(err) => {
        tracing::debug!(error = %err, "cl100k encoder unavailable, using character heuristic");
        None
    }
});

/// How a token count was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMethod {
    /// Exact count with the cl100k BPE encoder.
    Cl100k,
    /// Roughly four characters per token.
    CharacterHeuristic,
}

/// Approximate size of a document in model tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimate {
    pub tokens: usize,
    pub characters: usize,
    pub method: TokenMethod,
}

/// Estimate tokens for `text`, falling back to a character heuristic when the encoder
/// cannot be loaded.
pub fn estimate(text: &str) -> TokenEstimate {
    let characters = text.chars().count();
    let encoded = CL100K
        .as_ref()
        .and_then(|bpe| bpe.lock().ok())
        .map(|bpe| bpe.encode_ordinary(text).len());
    match encoded {
        Some(tokens) => TokenEstimate {
            tokens,
            characters,
            method: TokenMethod::Cl100k,
        },
        None => heuristic(characters),
    }
}

fn heuristic(characters: usize) -> TokenEstimate {
    TokenEstimate {
        tokens: characters.div_ceil(4),
        characters,
        method: TokenMethod::CharacterHeuristic,
    }
}
