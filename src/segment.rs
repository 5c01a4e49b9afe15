//! Budgeted segmentation.
//!
//! Splits normalized prose into chunks that each fit a character budget,
//! breaking only between words. Sentence ends are preferred break points:
//! a chunk that closes on one needs no marker, while a chunk cut mid-sentence
//! ends with [`CONTINUATION`].
//!
//! Budgets count characters, not bytes.

use serde::{Deserialize, Serialize};

/// Marker appended to a chunk that was cut mid-sentence.
pub const CONTINUATION: char = '…';

const SENTENCE_ENDS: [char; 3] = ['.', '!', '?'];

/// A contiguous span of plain text ready to become one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The chunk text, including its closing mark if any
    pub text: String,
    /// Whether the destination permalink is appended when rendered
    pub reserves_link: bool,
    /// Whether the chunk was cut mid-sentence and ends with [`CONTINUATION`]
    pub continues: bool,
}

impl TextChunk {
    /// Create a chunk that neither reserves a link nor continues.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reserves_link: false,
            continues: false,
        }
    }

    /// Render the chunk as it will be posted.
    pub fn render(&self, link: &str) -> String {
        if !self.reserves_link {
            return self.text.clone();
        }
        if self.text.is_empty() {
            link.to_string()
        } else {
            format!("{} {}", self.text, link)
        }
    }

    /// Length of the rendered chunk as the platform counts it.
    ///
    /// Platforms replace links with a fixed-width short URL, so the permalink
    /// counts as `link_width` characters whatever its real length.
    pub fn rendered_len(&self, link_width: usize) -> usize {
        let text = self.text.chars().count();
        match (self.reserves_link, text) {
            (false, _) => text,
            (true, 0) => link_width,
            (true, _) => text + 1 + link_width,
        }
    }

    /// The chunk text with its continuation marker removed.
    pub fn content(&self) -> &str {
        if self.continues {
            self.text.strip_suffix(CONTINUATION).unwrap_or(&self.text)
        } else {
            &self.text
        }
    }
}

/// A unit of text the segmenter can break around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A word, written with a space before it
    Word(&'a str),
    /// Sentence-ending punctuation, written directly after the previous word
    Stop(&'a str),
}

impl<'a> Token<'a> {
    fn as_str(&self) -> &'a str {
        match *self {
            Token::Word(s) | Token::Stop(s) => s,
        }
    }

    /// Characters this token adds to a chunk that already holds `chunk_len` characters.
    fn width(&self, chunk_len: usize) -> usize {
        let len = self.as_str().chars().count();
        match self {
            Token::Word(_) if chunk_len > 0 => len + 1,
            _ => len,
        }
    }
}

/// Split text into words and sentence-ending punctuation.
///
/// A word ending in `.`, `!` or `?` yields the word and its final punctuation
/// mark as separate tokens, so `"world."` becomes `Word("world")`, `Stop(".")`.
///
/// # Example
///
/// ```
/// use posse_thread::segment::{tokenize, Token};
///
/// assert_eq!(
///     tokenize("Hi there. Bye!"),
///     vec![
///         Token::Word("Hi"),
///         Token::Word("there"),
///         Token::Stop("."),
///         Token::Word("Bye"),
///         Token::Stop("!"),
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        // Sentence ends are ASCII, so the last byte is a char boundary.
        match word.len() {
            len if len > 1 && word.ends_with(SENTENCE_ENDS) => {
                tokens.push(Token::Word(&word[..len - 1]));
                tokens.push(Token::Stop(&word[len - 1..]));
            }
            _ => tokens.push(Token::Word(word)),
        }
    }
    tokens
}

/// Split text into chunks under the given budgets.
///
/// The first chunk gets `first_budget` and reserves the permalink; every later
/// chunk gets `rest_budget`. Tokens are added while the chunk stays strictly
/// under budget, leaving room for one closing character: the sentence-ending
/// punctuation that did not fit, or [`CONTINUATION`] when a word did not fit.
///
/// Empty text yields a single empty chunk so the permalink is still delivered.
/// A word wider than the budget is emitted verbatim as its own chunk, over
/// budget, rather than being cut. A word exactly as wide as the budget fills
/// its chunk with no room for a closing mark, so any sentence-ending
/// punctuation after it opens the next chunk.
///
/// # Example
///
/// ```
/// use posse_thread::segment::segment;
///
/// let chunks = segment("A. B. C.", 100, 100);
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].text, "A. B. C.");
/// assert!(chunks[0].reserves_link);
/// ```
pub fn segment(text: &str, first_budget: usize, rest_budget: usize) -> Vec<TextChunk> {
    segment_with(text, first_budget, rest_budget, true)
}

/// Segment text, optionally without reserving the permalink in the first chunk.
///
/// Used for prose that continues a thread, where no chunk carries the link.
pub(crate) fn segment_with(
    text: &str,
    first_budget: usize,
    rest_budget: usize,
    reserve_link: bool,
) -> Vec<TextChunk> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return vec![TextChunk {
            text: String::new(),
            reserves_link: reserve_link,
            continues: false,
        }];
    }

    let mut packer = Packer::new(first_budget, reserve_link);
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        if !packer.is_empty() {
            if packer.fits(token) {
                packer.push(token);
                continue;
            }
            if let Token::Stop(_) = token {
                packer.push(token);
                packer.flush(false, rest_budget);
                continue;
            }
            let continues = !packer.ends_sentence;
            if continues {
                packer.current.push(CONTINUATION);
            }
            packer.flush(continues, rest_budget);
        }

        packer.push(token);
        if !packer.has_room() {
            // Wider than the budget: keep it whole, with its punctuation.
            // A word that fills the budget exactly leaves its stop to the next chunk.
            if packer.is_oversized() {
                if let Some(stop @ Token::Stop(_)) = tokens.peek().copied() {
                    packer.push(stop);
                    tokens.next();
                }
            }
            packer.flush(false, rest_budget);
        }
    }

    packer.finish()
}

/// Truncate text to a single chunk of at most `budget` characters.
///
/// Returns the first chunk [`segment`] would produce; it ends with
/// [`CONTINUATION`] when text was cut mid-sentence.
pub fn truncate(text: &str, budget: usize) -> TextChunk {
    segment(text, budget, budget)
        .into_iter()
        .next()
        .unwrap_or_else(|| TextChunk {
            text: String::new(),
            reserves_link: true,
            continues: false,
        })
}

struct Packer {
    chunks: Vec<TextChunk>,
    current: String,
    width: usize,
    budget: usize,
    ends_sentence: bool,
    reserve_link: bool,
}

impl Packer {
    fn new(first_budget: usize, reserve_link: bool) -> Self {
        Self {
            chunks: Vec::new(),
            current: String::new(),
            width: 0,
            budget: first_budget,
            ends_sentence: false,
            reserve_link,
        }
    }

    fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn has_room(&self) -> bool {
        self.width < self.budget
    }

    fn is_oversized(&self) -> bool {
        self.width > self.budget
    }

    fn fits(&self, token: Token<'_>) -> bool {
        self.width + token.width(self.width) < self.budget
    }

    fn push(&mut self, token: Token<'_>) {
        self.width += token.width(self.width);
        if matches!(token, Token::Word(_)) && !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(token.as_str());
        self.ends_sentence = matches!(token, Token::Stop(_));
    }

    fn flush(&mut self, continues: bool, next_budget: usize) {
        let reserves_link = self.reserve_link && self.chunks.is_empty();
        self.chunks.push(TextChunk {
            text: std::mem::take(&mut self.current),
            reserves_link,
            continues,
        });
        self.width = 0;
        self.budget = next_budget;
        self.ends_sentence = false;
    }

    fn finish(mut self) -> Vec<TextChunk> {
        if !self.current.is_empty() {
            let budget = self.budget;
            self.flush(false, budget);
        }
        self.chunks
    }
}
