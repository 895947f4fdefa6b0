//! Field addresses inside a destination.

use std::fmt;

/// Represents a component of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    /// A struct field name
    Key(String),
    /// A position inside a slice of structs
    Index(usize),
}

/// Ordered address of a field, from the destination root down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    parts: Vec<KeyPart>,
}

impl FieldPath {
    /// Creates an empty path addressing the destination root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by a field name.
    pub fn key(&self, name: &str) -> Self {
        let mut parts = self.parts.clone();
        parts.push(KeyPart::Key(name.to_string()));
        Self { parts }
    }

    /// Returns a new path extended by a slice index.
    pub fn index(&self, index: usize) -> Self {
        let mut parts = self.parts.clone();
        parts.push(KeyPart::Index(index));
        Self { parts }
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// Joins the segments with `_`, keeping the declared case.
    pub fn env_segments(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                KeyPart::Key(name) => name.clone(),
                KeyPart::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            match part {
                KeyPart::Key(name) if i == 0 => write!(f, "{name}")?,
                KeyPart::Key(name) => write!(f, ".{name}")?,
                KeyPart::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
