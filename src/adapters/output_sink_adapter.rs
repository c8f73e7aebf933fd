//! Concrete [`OutputSink`] implementations (spec §4.1). Grounded on the
//! teacher's port/adapter split (`ports::document_generator::DocumentGenerator`
//! implemented by `adapters::pdf_writer_adapter::PdfWriterAdapter`).

use crate::error::Result;
use crate::ports::output_sink::{OutputSink, SinkArtifact};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

pub struct FileSink {
    path: PathBuf,
    file: File,
    byte_count: u64,
}

impl FileSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self { path, file, byte_count: 0 })
    }
}

impl OutputSink for FileSink {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.byte_count += bytes.len() as u64;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<SinkArtifact> {
        self.file.flush()?;
        Ok(SinkArtifact::File { path: self.path, byte_count: self.byte_count })
    }

    fn discard(self: Box<Self>) -> Result<()> {
        drop(self.file);
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BufferSink {
    bytes: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for BufferSink {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<SinkArtifact> {
        Ok(SinkArtifact::Buffer { bytes: self.bytes })
    }

    fn discard(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
