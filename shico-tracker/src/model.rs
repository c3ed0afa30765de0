//! Word-embedding models in word2vec format.
//!
//! Both word2vec layouts are supported:
//!
//! - **binary**: an ASCII `"<vocab> <dim>\n"` header, then for every word the
//!   word bytes up to a space followed by `dim` little-endian `f32` values
//!   (optionally followed by a newline).
//! - **text**: the same header, then one line per word: `word v1 v2 ... vdim`.
//!
//! Vectors are L2-normalised on load so similarity is a plain dot product.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ModelError;

/// Upper bound on how much is reserved up front from header counts.
const PREALLOC_LIMIT: usize = 1 << 20;

/// An in-memory embedding model for one time slice.
pub struct EmbeddingModel {
    words: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major, `words.len() * dim` normalised components.
    vectors: Vec<f32>,
    dim: usize,
}

impl EmbeddingModel {
    /// Build a model from `(word, vector)` pairs.
    ///
    /// The dimension is taken from the first vector. A repeated word replaces
    /// the earlier vector.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut model = Self::with_dim(0);
        for (word, vector) in entries {
            if model.words.is_empty() && model.dim == 0 {
                model.dim = vector.len();
            }
            model.push(word.into(), vector)?;
        }
        Ok(model)
    }

    /// Load a model file.
    pub fn load(path: &Path, binary: bool) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        Self::read(&mut reader, path, binary)
    }

    /// Read a model from any buffered reader. `path` is only used in errors.
    pub fn read<R: BufRead>(reader: &mut R, path: &Path, binary: bool) -> Result<Self, ModelError> {
        let (vocab, dim) = read_header(reader, path)?;
        let mut model = Self::with_dim(dim);
        model.words.reserve(vocab.min(PREALLOC_LIMIT));
        model.vectors.reserve(vocab.saturating_mul(dim).min(PREALLOC_LIMIT));

        for index in 0..vocab {
            let (word, vector) = if binary {
                read_binary_entry(reader, path, index, dim)?
            } else {
                read_text_entry(reader, path, index, dim)?
            };
            model.push(word, vector)?;
        }

        Ok(model)
    }

    /// Number of words in the vocabulary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Check whether a word is in the vocabulary.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Iterate over the vocabulary in load order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Cosine similarity between two words, if both are known.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.row(*self.index.get(a)?);
        let b = self.row(*self.index.get(b)?);
        Some(dot(a, b) as f64)
    }

    /// The `topn` words most similar to `word`, highest similarity first.
    ///
    /// The word itself is excluded; ties are broken alphabetically. Returns
    /// an empty list for unknown words.
    pub fn most_similar(&self, word: &str, topn: usize) -> Vec<(String, f64)> {
        let Some(&idx) = self.index.get(word) else {
            return Vec::new();
        };
        if topn == 0 || self.dim == 0 {
            return Vec::new();
        }

        let query = self.row(idx);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .par_chunks(self.dim)
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(i, row)| (i, dot(query, row)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.words[a.0].cmp(&self.words[b.0]))
        });
        scored.truncate(topn);

        scored
            .into_iter()
            .map(|(i, score)| (self.words[i].clone(), score as f64))
            .collect()
    }

    fn with_dim(dim: usize) -> Self {
        Self {
            words: Vec::new(),
            index: HashMap::new(),
            vectors: Vec::new(),
            dim,
        }
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dim..(i + 1) * self.dim]
    }

    fn push(&mut self, word: String, mut vector: Vec<f32>) -> Result<(), ModelError> {
        if vector.len() != self.dim {
            return Err(ModelError::Dimension {
                word,
                expected: self.dim,
                found: vector.len(),
            });
        }
        normalize(&mut vector);

        if let Some(&existing) = self.index.get(&word) {
            let start = existing * self.dim;
            self.vectors[start..start + self.dim].copy_from_slice(&vector);
            return Ok(());
        }

        self.index.insert(word.clone(), self.words.len());
        self.words.push(word);
        self.vectors.extend_from_slice(&vector);
        Ok(())
    }
}

impl fmt::Debug for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingModel")
            .field("words", &self.words.len())
            .field("dim", &self.dim)
            .finish()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

fn read_header<R: BufRead>(reader: &mut R, path: &Path) -> Result<(usize, usize), ModelError> {
    let header_err = |detail: String| ModelError::Header {
        path: path.to_path_buf(),
        detail,
    };

    let mut line = String::new();
    reader.read_line(&mut line).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parts = line.split_whitespace();
    let (Some(vocab), Some(dim), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(header_err(format!("expected '<vocab> <dim>', got {:?}", line.trim())));
    };
    let vocab: usize = vocab
        .parse()
        .map_err(|e| header_err(format!("vocabulary size '{}': {}", vocab, e)))?;
    let dim: usize = dim
        .parse()
        .map_err(|e| header_err(format!("dimension '{}': {}", dim, e)))?;
    if dim == 0 {
        return Err(header_err("dimension must be positive".to_string()));
    }
    if dim.checked_mul(4).is_none() {
        return Err(header_err(format!("dimension {} is too large", dim)));
    }

    Ok((vocab, dim))
}

fn entry_err(path: &Path, index: usize, detail: impl Into<String>) -> ModelError {
    ModelError::Entry {
        path: PathBuf::from(path),
        index,
        detail: detail.into(),
    }
}

fn read_binary_entry<R: BufRead>(
    reader: &mut R,
    path: &Path,
    index: usize,
    dim: usize,
) -> Result<(String, Vec<f32>), ModelError> {
    let mut raw = Vec::new();
    let read = reader
        .read_until(b' ', &mut raw)
        .map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if read == 0 || raw.last() != Some(&b' ') {
        return Err(entry_err(path, index, "unexpected end of file before word"));
    }
    raw.pop();

    // The newline that optionally terminates the previous vector ends up here.
    let start = raw
        .iter()
        .position(|b| !matches!(b, b'\n' | b'\r'))
        .unwrap_or(raw.len());
    let word = String::from_utf8_lossy(&raw[start..]).into_owned();
    if word.is_empty() {
        return Err(entry_err(path, index, "empty word"));
    }

    // Header counts are untrusted: read only what is there. `dim * 4` was
    // checked when the header was parsed.
    let row_bytes = dim * 4;
    let mut buf = Vec::new();
    Read::take(&mut *reader, row_bytes as u64)
        .read_to_end(&mut buf)
        .map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if buf.len() < row_bytes {
        return Err(entry_err(path, index, format!("truncated vector for '{}'", word)));
    }

    let vector = buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((word, vector))
}

fn read_text_entry<R: BufRead>(
    reader: &mut R,
    path: &Path,
    index: usize,
    dim: usize,
) -> Result<(String, Vec<f32>), ModelError> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            return Err(entry_err(path, index, "unexpected end of file"));
        }
        if !line.trim().is_empty() {
            break;
        }
    }

    let mut parts = line.split_whitespace();
    let word = parts
        .next()
        .map(str::to_string)
        .ok_or_else(|| entry_err(path, index, "missing word"))?;
    let vector = parts
        .map(|v| v.parse::<f32>())
        .collect::<Result<Vec<f32>, _>>()
        .map_err(|e| entry_err(path, index, format!("invalid component for '{}': {}", word, e)))?;
    if vector.len() != dim {
        return Err(ModelError::Dimension {
            word,
            expected: dim,
            found: vector.len(),
        });
    }

    Ok((word, vector))
}
