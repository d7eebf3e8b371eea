//! Archive fixtures and fakes shared by the resolver tests.

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use zip::write::SimpleFileOptions;

use crate::resolver::downloader::ArchiveFetcher;
use crate::resolver::probe::{ProbeOutcome, SystemProbe};

pub fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn append_entries<W: Write>(builder: &mut tar::Builder<W>, entries: &[(&str, &[u8])]) {
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
}

pub fn tar_xz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(xz2::write::XzEncoder::new(Vec::new(), 6));
    append_entries(&mut builder, entries);
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn tar_gz_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_entries(&mut builder, entries);
    builder.into_inner().unwrap().finish().unwrap()
}

/// Serves the same payload for every URL and records what was asked for.
/// Clones share the record.
#[derive(Clone)]
pub struct FakeFetcher {
    payload: Arc<Vec<u8>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn serving(payload: Vec<u8>) -> Self {
        Self { payload: Arc::new(payload), urls: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl ArchiveFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        tokio::fs::write(dest, self.payload.as_slice()).await?;
        Ok(())
    }
}

pub struct FailingFetcher;

impl ArchiveFetcher for FailingFetcher {
    async fn fetch(&self, url: &str, _dest: &Path) -> Result<()> {
        Err(anyhow::anyhow!("Failed to send GET request to {}: connection refused", url))
    }
}

#[derive(Clone)]
pub struct FakeProbe {
    outcome: ProbeOutcome,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn answering(outcome: ProbeOutcome) -> Self {
        Self { outcome, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn missing() -> Self {
        Self::answering(ProbeOutcome::SpawnFailed)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SystemProbe for FakeProbe {
    async fn probe(&self, _program: &str, _arg: &str, _timeout: Duration) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome
    }
}
