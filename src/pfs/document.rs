//! Sectioned configuration document tree, parser and writer

use std::fmt;
use std::fs;
use std::path::Path;

use super::error::{PfsError, Result};
use crate::io::write_string_atomic;

const INDENT: &str = "   ";

/// A child of a section, kept in file order
#[derive(Debug, Clone, PartialEq)]
pub enum PfsNode {
    Entry { key: String, value: String },
    Section(PfsSection),
    Comment(String),
}

/// `[NAME] ... EndSect` block
#[derive(Debug, Clone, PartialEq)]
pub struct PfsSection {
    name: String,
    children: Vec<PfsNode>,
}

impl PfsSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[PfsNode] {
        &self.children
    }

    /// Raw value of `key` (first occurrence)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            PfsNode::Entry { key: k, value } if k.eq_ignore_ascii_case(key) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Parse the value of `key`
    pub fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.get(key).ok_or_else(|| PfsError::KeyNotFound {
            section: self.name.clone(),
            key: key.to_string(),
        })?;
        raw.trim().parse::<T>().map_err(|_| PfsError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Set `key`, replacing the first existing entry or appending a new one
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        for node in &mut self.children {
            if let PfsNode::Entry { key: k, value: v } = node {
                if k.eq_ignore_ascii_case(key) {
                    *v = value;
                    return;
                }
            }
        }
        let insert_at = self
            .children
            .iter()
            .position(|n| matches!(n, PfsNode::Section(_)))
            .unwrap_or(self.children.len());
        self.children.insert(
            insert_at,
            PfsNode::Entry {
                key: key.to_string(),
                value,
            },
        );
    }

    /// Direct child section by name
    pub fn section(&self, name: &str) -> Option<&PfsSection> {
        self.children.iter().find_map(|node| match node {
            PfsNode::Section(s) if s.name.eq_ignore_ascii_case(name) => Some(s),
            _ => None,
        })
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut PfsSection> {
        self.children.iter_mut().find_map(|node| match node {
            PfsNode::Section(s) if s.name.eq_ignore_ascii_case(name) => Some(s),
            _ => None,
        })
    }

    pub fn push(&mut self, node: PfsNode) {
        self.children.push(node);
    }

    fn write_to(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = INDENT.repeat(depth);
        writeln!(f, "{pad}[{}]", self.name)?;
        for node in &self.children {
            match node {
                PfsNode::Entry { key, value } => writeln!(f, "{pad}{INDENT}{key} = {value}")?,
                PfsNode::Comment(text) => writeln!(f, "{pad}{INDENT}{text}")?,
                PfsNode::Section(section) => section.write_to(f, depth + 1)?,
            }
        }
        writeln!(f, "{pad}EndSect  // {}", self.name)?;
        if depth == 0 {
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whole configuration file: leading comments plus top-level sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PfsDocument {
    header: Vec<String>,
    sections: Vec<PfsSection>,
}

impl PfsDocument {
    /// Parse document text
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = PfsDocument::default();
        let mut stack: Vec<PfsSection> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim().trim_start_matches('\u{feff}');
            if line.is_empty() {
                continue;
            }

            if line.starts_with("//") {
                match stack.last_mut() {
                    Some(section) => section.push(PfsNode::Comment(line.to_string())),
                    None => doc.header.push(line.to_string()),
                }
                continue;
            }

            if line.starts_with("EndSect") {
                let closed = stack.pop().ok_or_else(|| PfsError::Syntax {
                    line: line_no,
                    message: "EndSect without open section".to_string(),
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.push(PfsNode::Section(closed)),
                    None => doc.sections.push(closed),
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| PfsError::Syntax {
                    line: line_no,
                    message: format!("unterminated section header '{line}'"),
                })?;
                if name.trim().is_empty() {
                    return Err(PfsError::Syntax {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                stack.push(PfsSection::new(name.trim()));
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let section = stack.last_mut().ok_or_else(|| PfsError::Syntax {
                    line: line_no,
                    message: format!("entry '{}' outside of any section", key.trim()),
                })?;
                section.push(PfsNode::Entry {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                });
                continue;
            }

            return Err(PfsError::Syntax {
                line: line_no,
                message: format!("unrecognised line '{line}'"),
            });
        }

        if let Some(open) = stack.last() {
            return Err(PfsError::Syntax {
                line: text.lines().count(),
                message: format!("section [{}] is never closed", open.name),
            });
        }

        Ok(doc)
    }

    /// Read and parse a file
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| PfsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Write the document atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        write_string_atomic(path, &self.to_string()).map_err(|source| PfsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sections(&self) -> &[PfsSection] {
        &self.sections
    }

    pub fn add_section(&mut self, section: PfsSection) {
        self.sections.push(section);
    }

    /// Look up a section by slash-separated path, e.g. `FemEngineHD/TIME`
    pub fn section(&self, path: &str) -> Option<&PfsSection> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let mut current = self
            .sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(first))?;
        for part in parts {
            current = current.section(part)?;
        }
        Some(current)
    }

    pub fn section_mut(&mut self, path: &str) -> Option<&mut PfsSection> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let mut current = self
            .sections
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(first))?;
        for part in parts {
            current = current.section_mut(part)?;
        }
        Some(current)
    }

    /// Like [`PfsDocument::section`] but with an error naming the path
    pub fn require_section(&self, path: &str) -> Result<&PfsSection> {
        self.section(path)
            .ok_or_else(|| PfsError::SectionNotFound(path.to_string()))
    }

    pub fn require_section_mut(&mut self, path: &str) -> Result<&mut PfsSection> {
        self.section_mut(path)
            .ok_or_else(|| PfsError::SectionNotFound(path.to_string()))
    }
}

impl fmt::Display for PfsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.header {
            writeln!(f, "{line}")?;
        }
        if !self.header.is_empty() {
            writeln!(f)?;
        }
        for section in &self.sections {
            section.write_to(f, 0)?;
        }
        Ok(())
    }
}

/// Quote a path the way file references are written: `|path|`
pub fn quote_file(path: &Path) -> String {
    format!("|{}|", path.display())
}

/// Quote a string value: `'text'`
pub fn quote_str(value: &str) -> String {
    format!("'{value}'")
}

/// Strip `|...|` or `'...'` quoting from a raw value
pub fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    for q in ['|', '\''] {
        if let Some(inner) = raw.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner;
        }
    }
    raw
}
