//! Converter output parsing
//!
//! The converter writes one block per input tree, blocks separated by a
//! blank line. Each row is tab-separated:
//!
//! ```text
//! ID  FORM  LEMMA  POS  FEATS  HEAD  DEPREL  _  _  _
//! ```
//!
//! IDs and heads are 1-indexed on disk (head `0` is the root) and 0-indexed
//! in [`DepTree`].

use atoi::FromRadix10Checked;
use memchr::memmem;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines};
use std::path::Path;
use thiserror::Error;

use crate::tree::{DepNode, DepTree, Features, NodeId};

/// Columns up to and including DEPREL; trailing columns are ignored
const MIN_FIELDS: usize = 7;

/// Error during output parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct DepParseError {
    pub line_num: usize,
    pub message: String,
}

/// Split raw output into one block per tree
///
/// The text is trimmed first; empty text yields no blocks.
pub fn split_blocks(text: &str) -> Vec<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut blocks = Vec::new();
    let mut start = 0;
    for pos in memmem::find_iter(text.as_bytes(), b"\n\n") {
        blocks.push(&text[start..pos]);
        start = pos + 2;
    }
    blocks.push(&text[start..]);
    blocks
}

/// Reader that iterates over the trees in converter output
pub struct DepReader<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}

impl DepReader<BufReader<File>> {
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl DepReader<Cursor<String>> {
    pub fn from_string(text: &str) -> Self {
        Self::new(Cursor::new(text.to_string()))
    }
}

impl<R: BufRead> DepReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for DepReader<R> {
    type Item = Result<DepTree, DepParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows = Vec::new();

        loop {
            match self.lines.next() {
                None => {
                    if rows.is_empty() {
                        return None;
                    }
                    break;
                }
                Some(Err(e)) => {
                    return Some(Err(DepParseError {
                        line_num: self.line_num + 1,
                        message: format!("IO error: {}", e),
                    }));
                }
                Some(Ok(line)) => {
                    self.line_num += 1;
                    if line.trim().is_empty() {
                        if !rows.is_empty() {
                            break;
                        }
                        continue;
                    }
                    if line.starts_with('#') {
                        continue;
                    }
                    rows.push((self.line_num, line.to_string()));
                }
            }
        }

        Some(parse_tree(rows))
    }
}

/// Parse every tree in `text`
pub fn parse_output(text: &str) -> Result<Vec<DepTree>, DepParseError> {
    DepReader::from_string(text).collect()
}

/// Parse one output block, which must hold exactly one tree
pub fn parse_block(block: &str) -> Result<DepTree, DepParseError> {
    let mut reader = DepReader::from_string(block);
    let tree = reader.next().unwrap_or_else(|| {
        Err(DepParseError {
            line_num: 1,
            message: "Empty block".to_string(),
        })
    })?;
    if reader.next().is_some() {
        return Err(DepParseError {
            line_num: reader.line_num,
            message: "More than one tree in block".to_string(),
        });
    }
    Ok(tree)
}

fn parse_tree(rows: Vec<(usize, String)>) -> Result<DepTree, DepParseError> {
    let mut nodes = Vec::with_capacity(rows.len());
    for (line_num, row) in &rows {
        let id = nodes.len();
        nodes.push(parse_row(row, *line_num, id)?);
    }

    let node_count = nodes.len();
    for (node, (line_num, _)) in nodes.iter().zip(&rows) {
        if let Some(head) = node.head.filter(|&head| head >= node_count) {
            return Err(DepParseError {
                line_num: *line_num,
                message: format!("HEAD {} outside sentence of {} tokens", head + 1, node_count),
            });
        }
    }

    Ok(DepTree::from_nodes(nodes))
}

fn parse_row(row: &str, line_num: usize, node_id: NodeId) -> Result<DepNode, DepParseError> {
    let fields: Vec<&str> = row.split('\t').collect();
    if fields.len() < MIN_FIELDS {
        return Err(DepParseError {
            line_num,
            message: format!("Expected at least {} fields, found {}", MIN_FIELDS, fields.len()),
        });
    }

    let id = parse_index(fields[0]).ok_or_else(|| DepParseError {
        line_num,
        message: format!("Invalid ID: {}", fields[0]),
    })?;
    if id != node_id + 1 {
        return Err(DepParseError {
            line_num,
            message: format!("Expected ID {}, found {}", node_id + 1, id),
        });
    }

    let head = match fields[5] {
        "_" => None,
        s => match parse_index(s) {
            Some(0) => None,
            Some(head) => Some(head - 1),
            None => {
                return Err(DepParseError {
                    line_num,
                    message: format!("Invalid HEAD: {}", s),
                });
            }
        },
    };

    let mut node = DepNode::new(node_id, fields[1], fields[2], fields[3], fields[6]);
    node.feats = parse_features(fields[4]);
    node.head = head;
    Ok(node)
}

/// Parse a whole field as an unsigned decimal
fn parse_index(field: &str) -> Option<usize> {
    match usize::from_radix_10_checked(field.as_bytes()) {
        (Some(n), used) if used > 0 && used == field.len() => Some(n),
        _ => None,
    }
}

/// Parse FEATS field (key=value|key=value)
fn parse_features(s: &str) -> Features {
    let mut feats = Features::default();
    if s == "_" {
        return feats;
    }

    for pair in s.split('|') {
        if let Some((key, value)) = pair.split_once('=') {
            feats.insert(key.to_string(), value.to_string());
        }
    }
    feats
}
