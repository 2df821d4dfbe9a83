//! Text analyzers.
//!
//! Every opened index gets the collection's analyzer registered under a
//! fixed name, and every tokenized field refers to that name. The same
//! analyzer tokenizes keywords at query time, so index and query terms agree.
//!
//! # Analyzers
//!
//! - `unicode` (default): UAX #29 word boundaries → LowerCaser →
//!   RemoveLongFilter. Ideographic scripts (Chinese, Japanese kanji) have no
//!   word boundaries inside a run, so each ideograph becomes its own term and
//!   multi-character keywords are matched as phrases.
//! - `simple`: SimpleTokenizer → LowerCaser
//! - `en_stem`: SimpleTokenizer → LowerCaser → Stemmer(English)
//!
//! ```rust
//! use quarry_fts::Analyzer;
//!
//! assert_eq!(Analyzer::Unicode.tokenize("中国经济"), vec!["中", "国", "经", "济"]);
//! assert_eq!(Analyzer::EnStem.tokenize("Running fast"), vec!["run", "fast"]);
//! ```

use serde::{Deserialize, Serialize};
use tantivy::Index;
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer, Token,
    TokenStream, Tokenizer,
};
use unicode_segmentation::{UnicodeSegmentation, UnicodeWordIndices};

/// Name under which the collection analyzer is registered on an index.
pub const ANALYZER_NAME: &str = "quarry";

/// Tokens longer than this many bytes are dropped.
const MAX_TOKEN_BYTES: usize = 40;

/// Text analyzer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Unicode word segmentation, lower-cased.
    #[default]
    Unicode,
    /// Whitespace/punctuation splitting, lower-cased.
    Simple,
    /// Simple splitting with English stemming.
    EnStem,
}

impl Analyzer {
    /// Build the tantivy analyzer.
    pub fn text_analyzer(self) -> TextAnalyzer {
        match self {
            Analyzer::Unicode => TextAnalyzer::builder(UnicodeWordTokenizer)
                .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                .filter(LowerCaser)
                .build(),
            Analyzer::Simple => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                .filter(LowerCaser)
                .build(),
            Analyzer::EnStem => TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
                .filter(LowerCaser)
                .filter(Stemmer::new(Language::English))
                .build(),
        }
    }

    /// Register this analyzer with an index under [`ANALYZER_NAME`].
    ///
    /// Must be called after creating/opening an index and before writing or
    /// parsing queries.
    pub fn register(self, index: &Index) {
        index
            .tokenizers()
            .register(ANALYZER_NAME, self.text_analyzer());
    }

    /// Tokenize text into its ordered sequence of terms.
    pub fn tokenize(self, text: &str) -> Vec<String> {
        let mut analyzer = self.text_analyzer();
        let mut stream = analyzer.token_stream(text);
        let mut terms = Vec::new();
        while let Some(token) = stream.next() {
            terms.push(token.text.clone());
        }
        terms
    }
}

/// Tokenizer emitting one token per UAX #29 word.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeWordTokenizer;

/// Token stream produced by [`UnicodeWordTokenizer`].
pub struct UnicodeWordTokenStream<'a> {
    words: UnicodeWordIndices<'a>,
    token: Token,
}

impl Tokenizer for UnicodeWordTokenizer {
    type TokenStream<'a> = UnicodeWordTokenStream<'a>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        UnicodeWordTokenStream {
            words: text.unicode_word_indices(),
            token: Token::default(),
        }
    }
}

impl TokenStream for UnicodeWordTokenStream<'_> {
    fn advance(&mut self) -> bool {
        let Some((offset, word)) = self.words.next() else {
            return false;
        };
        self.token.text.clear();
        self.token.text.push_str(word);
        self.token.offset_from = offset;
        self.token.offset_to = offset + word.len();
        // Token::default() starts at usize::MAX so the first token lands on 0.
        self.token.position = self.token.position.wrapping_add(1);
        true
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}

// ============================================================================
// Tests
// ============================================================================
