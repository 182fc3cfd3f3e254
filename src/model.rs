//! Data model for aligned sequences.
//!
//! This module contains the data structures shared by the parser and the
//! scorer:
//! - `Sequence`: one identifier and its aligned bases
//! - `Alignment`: the insertion-ordered store of all sequences in a file
//!
//! Insertion order is observable: pairs are scored and reported in the order
//! identifiers first appeared in the input.

use indexmap::map::Entry;
use indexmap::IndexMap;

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// The normalized bases (A, C, G, T, -, N)
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sequence data as bytes (for column-wise comparison).
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Returns the sequence data as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

/// Represents an alignment of multiple sequences, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    sequences: IndexMap<String, Sequence>,
    /// Whether the parser had to replace characters outside the DNA alphabet
    pub invalid_characters_found: bool,
}

impl Alignment {
    /// Creates an empty alignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an alignment from a vector of sequences, in order.
    pub fn from_sequences(sequences: Vec<Sequence>) -> Self {
        let mut alignment = Self::new();
        for seq in sequences {
            alignment.insert(seq);
        }
        alignment
    }

    /// Inserts a sequence.
    ///
    /// A sequence whose identifier is already present replaces the stored
    /// data but keeps the position of the first occurrence. Returns the
    /// replaced sequence, if any.
    pub fn insert(&mut self, seq: Sequence) -> Option<Sequence> {
        match self.sequences.entry(seq.id.clone()) {
            Entry::Occupied(mut slot) => Some(std::mem::replace(slot.get_mut(), seq)),
            Entry::Vacant(slot) => {
                slot.insert(seq);
                None
            }
        }
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns true if the alignment is empty.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Gets a sequence by insertion index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get_index(index).map(|(_, seq)| seq)
    }

    /// Iterates over the sequences in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Iterates over the identifiers in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    /// Returns the alignment length, i.e. the length of the first sequence.
    pub fn alignment_length(&self) -> usize {
        self.get(0).map(Sequence::len).unwrap_or(0)
    }

    /// Returns the first sequence whose length differs from the first one.
    pub fn first_length_mismatch(&self) -> Option<&Sequence> {
        let expected = self.alignment_length();
        self.iter().find(|s| s.len() != expected)
    }
}
