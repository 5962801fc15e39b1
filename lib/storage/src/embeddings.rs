//! Embedding tables stored as CSV
//!
//! One row per image: `identifier,v1,v2,...,vn`. Blank lines are ignored and a
//! first line whose values do not parse is taken as a header. Any later
//! unparsable line makes the whole source malformed.

use ahash::AHashMap;
use atomicwrites::{AtomicFile, OverwriteBehavior};
use pixrank_core::{CorpusEntry, EmbeddingSource, Error, Result, Vector};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Identifier-keyed embeddings, kept in file order
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    entries: Vec<(String, Vector)>,
    index: AHashMap<String, usize>,
}

impl EmbeddingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an embedding. Returns `false` (and keeps the existing row) if the
    /// identifier is already present.
    pub fn insert(&mut self, id: impl Into<String>, vector: Vector) -> bool {
        let id = id.into();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, vector));
        true
    }

    pub fn get(&self, id: &str) -> Option<&Vector> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Every row as a corpus entry, in file order
    pub fn entries(&self) -> Vec<CorpusEntry> {
        self.entries
            .iter()
            .map(|(id, vector)| CorpusEntry::new(id.clone(), vector.clone()))
            .collect()
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text)?;
        tracing::info!("Loaded {} embeddings from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::new();
        let mut seen_content = false;

        for (i, line) in text.lines().enumerate() {
            let line_number = i + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let first = !seen_content;
            seen_content = true;

            let (id, vector) = match parse_row(line) {
                Ok(row) => row,
                Err(_) if first => {
                    tracing::debug!("Treating line {} as a header", line_number);
                    continue;
                }
                Err(reason) => {
                    return Err(Error::Parse {
                        line: line_number,
                        reason,
                    })
                }
            };

            if !table.insert(id, vector) {
                tracing::warn!(
                    "Duplicate embedding for {} at line {}, keeping the first",
                    id,
                    line_number
                );
            }
        }
        Ok(table)
    }

    /// Write the table as CSV, replacing `path` atomically
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
        file.write(|f| {
            let mut out = io::BufWriter::new(f);
            for (id, vector) in &self.entries {
                write!(out, "{}", id)?;
                for value in vector.as_slice() {
                    write!(out, ",{}", value)?;
                }
                writeln!(out)?;
            }
            out.flush()
        })
        .map_err(|e| match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
        })?;
        tracing::info!("Wrote {} embeddings to {}", self.len(), path.display());
        Ok(())
    }
}

impl EmbeddingSource for EmbeddingTable {
    fn lookup(&self, id: &str) -> Result<Vector> {
        self.get(id)
            .cloned()
            .ok_or_else(|| Error::LookupMiss(id.to_string()))
    }
}

fn parse_row(line: &str) -> std::result::Result<(&str, Vector), String> {
    let mut columns = line.split(',');
    let id = columns.next().map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err("missing identifier".to_string());
    }

    let values = columns
        .map(|c| {
            c.trim()
                .parse::<f32>()
                .map_err(|e| format!("bad value {:?}: {}", c.trim(), e))
        })
        .collect::<std::result::Result<Vec<f32>, String>>()?;
    if values.is_empty() {
        return Err(format!("no values for {}", id));
    }
    Ok((id, Vector::new(values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_with_header_and_blank_lines() {
        let text = "filename,f0,f1\n\na.jpg,0.5,1\n  \nb.jpg, -2 ,3e-1\n";
        let table = EmbeddingTable::parse(text).unwrap();
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(table.get("b.jpg").unwrap().as_slice(), &[-2.0, 0.3]);
    }

    #[test]
    fn test_parse_without_header() {
        let table = EmbeddingTable::parse("a.jpg,1,2\n").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let err = EmbeddingTable::parse("a.jpg,1,2\nb.jpg,1,oops\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
        assert!(matches!(
            EmbeddingTable::parse("id,x\na.jpg\n"),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let table = EmbeddingTable::parse("a,1\nb,2\na,3\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a").unwrap().as_slice(), &[1.0]);
    }

    #[test]
    fn test_lookup_miss_is_reported() {
        let table = EmbeddingTable::parse("a,1,0\n").unwrap();
        assert!(table.lookup("a").is_ok());
        assert!(matches!(table.lookup("b"), Err(Error::LookupMiss(id)) if id == "b"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let mut table = EmbeddingTable::new();
        table.insert("x.png", Vector::new(vec![0.125, -1.5, 3.0]));
        table.insert("y.png", Vector::new(vec![0.1, 0.2, 0.3]));
        table.write_csv(&path).unwrap();

        let read = EmbeddingTable::read_csv(&path).unwrap();
        let entries = read.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "x.png");
        assert_eq!(read.get("y.png"), table.get("y.png"));
    }
}
