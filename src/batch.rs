use std::io::Read;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::strip::blocks::BlockMarkers;
use crate::strip::{collapse_whitespace, remove_tags, Sanitizer};

const CHUNK_SIZE: usize = 500;
const STDIN_NAME: &str = "-";

/// One input text and where it came from (`None` for stdin).
#[derive(Debug, Clone)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub text: String,
}

impl Document {
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| STDIN_NAME.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Output {
    pub path: String,
    pub text: String,
    pub input_len: usize,
    pub output_len: usize,
}

/// Which transformation a batch run applies to every document.
#[derive(Debug, Clone)]
pub enum Operation {
    StripHtml,
    RemoveTags,
    RemoveBlock(BlockMarkers),
    CollapseWhitespace,
}

impl Operation {
    pub fn apply(&self, sanitizer: &Sanitizer, text: &str) -> String {
        match self {
            Operation::StripHtml => sanitizer.strip_html(text),
            Operation::RemoveTags => remove_tags(text).into_owned(),
            Operation::RemoveBlock(markers) => markers.strip(text).into_owned(),
            Operation::CollapseWhitespace => collapse_whitespace(text),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub documents: usize,
    pub input_bytes: usize,
    pub output_bytes: usize,
}

impl BatchStats {
    pub fn from_outputs(outputs: &[Output]) -> Self {
        outputs.iter().fold(Self::default(), |acc, o| Self {
            documents: acc.documents + 1,
            input_bytes: acc.input_bytes + o.input_len,
            output_bytes: acc.output_bytes + o.output_len,
        })
    }
}

pub fn load_documents(paths: &[PathBuf]) -> Result<Vec<Document>> {
    paths.iter().map(|p| load_document(p)).collect()
}

fn load_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document {
        path: Some(path.to_path_buf()),
        text,
    })
}

pub fn read_stdin() -> Result<Document> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|source| Error::Io {
            path: PathBuf::from(STDIN_NAME),
            source,
        })?;
    Ok(Document { path: None, text })
}

/// Run `op` over every document in parallel. Output order matches input order.
pub fn process_documents(
    docs: &[Document],
    op: &Operation,
    sanitizer: &Sanitizer,
    show_progress: bool,
) -> Vec<Output> {
    let pb = if show_progress {
        let pb = ProgressBar::new(docs.len() as u64);
        pb.set_style(progress_style());
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut outputs = Vec::with_capacity(docs.len());
    for chunk in docs.chunks(CHUNK_SIZE) {
        let results: Vec<Output> = chunk
            .par_iter()
            .map(|doc| {
                let text = op.apply(sanitizer, &doc.text);
                Output {
                    path: doc.name(),
                    input_len: doc.text.len(),
                    output_len: text.len(),
                    text,
                }
            })
            .collect();
        outputs.extend(results);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    let stats = BatchStats::from_outputs(&outputs);
    if docs.len() > 1 {
        info!(
            "Processed {} documents ({} -> {} bytes)",
            stats.documents, stats.input_bytes, stats.output_bytes
        );
    } else {
        debug!(input_bytes = stats.input_bytes, output_bytes = stats.output_bytes, "processed document");
    }
    outputs
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
