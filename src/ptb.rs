//! Penn Treebank input checks
//!
//! Optional validation of bracketed trees before they are handed to the
//! converter. Catches unbalanced brackets and stray text up front, and
//! rejects blank lines inside a tree since they are the block separator in
//! both the request and the output file.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "ptb.pest"]
struct PtbParser;

/// Error type for tree validation failures
#[derive(Debug, Error)]
pub enum PtbError {
    #[error("{0}")]
    Syntax(#[from] pest::error::Error<Rule>),

    #[error("blank line at line {line} would split the tree")]
    BlankLine { line: usize },
}

/// Check that `text` is one or more well-formed bracketed trees
pub fn validate_tree(text: &str) -> Result<(), PtbError> {
    let text = text.trim();

    if let Some(idx) = text.lines().position(|line| line.trim().is_empty()) {
        return Err(PtbError::BlankLine { line: idx + 1 });
    }

    PtbParser::parse(Rule::trees, text)?;
    Ok(())
}
