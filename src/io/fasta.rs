use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use log::warn;
use std::io::{BufRead, BufReader};

use crate::util::dna;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// Streaming FASTA reader. Sequence bytes are upper-cased; whitespace inside
/// sequence lines is dropped.
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    pending_header: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new(), pending_header: None, done: false }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        Ok(self.reader.read_line(&mut self.line)? > 0)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // Skip anything before the first header
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => loop {
                if !self.read_line()? {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(h) = self.line.strip_prefix('>') {
                    break h.trim().to_string();
                }
            },
        };

        let (id, desc) = match header.split_once(char::is_whitespace) {
            Some((id, rest)) => {
                let rest = rest.trim();
                (id.to_string(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (header, None),
        };

        let mut seq = Vec::new();
        while self.read_line()? {
            if let Some(h) = self.line.strip_prefix('>') {
                self.pending_header = Some(h.trim().to_string());
                return Ok(Some(FastaRecord { id, desc, seq }));
            }
            seq.extend(
                self.line
                    .bytes()
                    .filter(|b| !b.is_ascii_whitespace())
                    .map(|b| b.to_ascii_uppercase()),
            );
        }
        self.done = true;
        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wrap `reader` in a gzip decoder when the stream starts with the gzip magic.
pub fn maybe_gunzip<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn BufRead + 'a>> {
    let gz = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    Ok(if gz {
        Box::new(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        Box::new(reader)
    })
}

fn open(path: &str) -> Result<FastaReader<Box<dyn BufRead>>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open FASTA '{}'", path))?;
    let reader = maybe_gunzip(BufReader::new(fh)).with_context(|| format!("cannot read '{}'", path))?;
    Ok(FastaReader::new(reader))
}

/// Read every record of a reference FASTA and concatenate them into one
/// encoded text.
pub fn read_reference<R: BufRead>(reader: FastaReader<R>, name: &str) -> Result<Vec<u8>> {
    let mut text = Vec::new();
    let mut n_seqs = 0usize;
    for rec in reader {
        let rec = rec?;
        n_seqs += 1;
        text.extend(rec.seq.iter().map(|&b| dna::to_alphabet(b)));
    }
    if n_seqs == 0 {
        bail!("FASTA file '{}' contains no sequences", name);
    }
    if text.is_empty() {
        bail!("FASTA file '{}' contains only empty sequences", name);
    }
    if n_seqs > 1 {
        warn!("'{}' holds {} records; searching their concatenation", name, n_seqs);
    }
    Ok(text)
}

/// Read one encoded query per record; empty records are skipped.
pub fn read_queries<R: BufRead>(reader: FastaReader<R>, name: &str) -> Result<Vec<Vec<u8>>> {
    let mut queries = Vec::new();
    for rec in reader {
        let rec = rec?;
        if rec.seq.is_empty() {
            warn!("skipping empty query '{}' in '{}'", rec.id, name);
            continue;
        }
        queries.push(dna::encode(&rec.seq));
    }
    Ok(queries)
}

pub fn load_reference(path: &str) -> Result<Vec<u8>> {
    read_reference(open(path)?, path)
}

pub fn load_queries(path: &str) -> Result<Vec<Vec<u8>>> {
    read_queries(open(path)?, path)
}
