use thiserror::Error;

/// Fatal lexical errors. Any of these aborts the whole lex pass.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("unclassifiable character {ch:?} at offset {offset}")]
    UnclassifiedCharacter { ch: char, offset: usize },

    #[error("lex range {start}..{end} is not valid for text of length {len}")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("invalid lexer pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("lexer rule `{pattern}` produced token {start}..{end} outside the scan position {position}")]
    CustomTokenOutOfRange {
        pattern: String,
        start: usize,
        end: usize,
        position: usize,
    },
}
