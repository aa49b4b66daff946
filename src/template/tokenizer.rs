//! Character-level scanner used by the placeholder rewriter.

/// Walks a string one character at a time and can split at arbitrary
/// delimiter characters.
///
/// # Examples
///
/// ```
/// use request_actions::template::Tokenizer;
///
/// let mut tokenizer = Tokenizer::new("name}rest");
/// assert_eq!(tokenizer.next_until('}'), Some("name".to_string()));
/// assert_eq!(tokenizer.rest(), "rest");
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    chars: Vec<char>,
    index: usize,
}

impl Tokenizer {
    /// Creates a tokenizer positioned at the beginning of `value`.
    pub fn new(value: &str) -> Self {
        Self {
            chars: value.chars().collect(),
            index: 0,
        }
    }

    /// Returns the next character and advances the cursor.
    pub fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.index).copied();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    /// Returns the next character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Reads characters up to (not including) `delimiter` and consumes the
    /// delimiter.
    ///
    /// Returns `None` when the input ends before the delimiter is found; the
    /// cursor is left at the end of the input in that case.
    pub fn next_until(&mut self, delimiter: char) -> Option<String> {
        let mut result = String::new();
        loop {
            match self.next_char() {
                Some(ch) if ch == delimiter => return Some(result),
                Some(ch) => result.push(ch),
                None => return None,
            }
        }
    }

    /// Unconsumed remainder of the input.
    pub fn rest(&self) -> String {
        self.chars[self.index.min(self.chars.len())..].iter().collect()
    }

    /// Current cursor position, in characters.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Whether the whole input has been consumed.
    pub fn eof(&self) -> bool {
        self.index >= self.chars.len()
    }
}
