//! Content sources and a reloadable, layered configuration.
//!
//! A [`Configuration`] reads each of its [`ContentSource`]s in order and
//! parses them into one [`ParsedContent`]; pairs from later sources win
//! single-value reads. The current snapshot is swapped atomically on
//! [`Configuration::reload`], so readers holding an older snapshot keep a
//! consistent view.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use crate::bind::{Configurable, KeyComparer, Populator};
use crate::decode::ParsedContent;
use crate::lookup::Lookup;
use crate::options::BindOptions;
use crate::{Error, Result};

/// Supplies raw configuration text.
pub trait ContentSource: Send + Sync {
    /// Name reported in parse logs and read errors.
    fn source_id(&self) -> String;

    fn get_text(&self) -> Result<String>;
}

/// In-memory text.
#[derive(Debug, Clone)]
pub struct TextSource {
    id: String,
    text: String,
}

impl TextSource {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl ContentSource for TextSource {
    fn source_id(&self) -> String {
        self.id.clone()
    }

    fn get_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// A file read afresh on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for FileSource {
    fn source_id(&self) -> String {
        self.path.display().to_string()
    }

    fn get_text(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|err| Error::read_failed(self.source_id(), err))
    }
}

/// One loaded generation of content. The lookup is derived on first use.
#[derive(Debug, Default)]
pub struct Snapshot {
    content: ParsedContent,
    lookup: OnceCell<Lookup>,
    generation: u64,
}

impl Snapshot {
    pub fn content(&self) -> &ParsedContent {
        &self.content
    }

    pub fn lookup(&self) -> &Lookup {
        self.lookup.get_or_init(|| self.content.lookup())
    }

    /// Incremented by every successful reload, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn populator(&self, options: &BindOptions) -> Populator<'_> {
        Populator::new(self.content.pairs()).with_options(options.clone())
    }
}

pub struct Configuration {
    sources: Vec<Box<dyn ContentSource>>,
    options: BindOptions,
    current: RwLock<Arc<Snapshot>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            options: BindOptions::default(),
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Adds a source layered over those already added. Takes effect on the
    /// next [`reload`](Self::reload).
    pub fn with_source(mut self, source: impl ContentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_text(self, id: &str, text: &str) -> Self {
        self.with_source(TextSource::new(id, text))
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_source(FileSource::new(path))
    }

    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Builds from `sources` and loads them once.
    pub fn load(self) -> Result<Self> {
        self.reload()?;
        Ok(self)
    }

    /// Re-reads every source. On failure the previous snapshot stays current.
    pub fn reload(&self) -> Result<Arc<Snapshot>> {
        let mut content = ParsedContent::new();
        for source in &self.sources {
            let text = source.get_text()?;
            content.add_source(&source.source_id(), &text);
        }
        let mut current = self.current.write();
        let snapshot = Arc::new(Snapshot {
            content,
            lookup: OnceCell::new(),
            generation: current.generation + 1,
        });
        *current = Arc::clone(&snapshot);
        debug!(
            sources = self.sources.len(),
            pairs = snapshot.content.len(),
            generation = snapshot.generation,
            "reloaded configuration"
        );
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.snapshot().lookup().contains(key)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.snapshot().lookup().value(key).map(str::to_string)
    }

    /// Every present value under `key`, in source order.
    pub fn all(&self, key: &str) -> Vec<String> {
        self.snapshot()
            .lookup()
            .all(key)
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect()
    }

    pub fn configure<T: Configurable>(&self, target: T, prefix: &str) -> Result<T> {
        self.snapshot()
            .populator(&self.options)
            .configure(target, prefix)
    }

    pub fn populate(&self, target: &mut dyn Configurable, prefix: &str) -> Result<()> {
        self.snapshot()
            .populator(&self.options)
            .populate(target, prefix)
    }

    pub fn configure_many<T, F>(&self, factory: F, prefix: &str) -> Result<Vec<T>>
    where
        T: Configurable,
        F: FnMut() -> T,
    {
        self.snapshot()
            .populator(&self.options)
            .populate_many(factory, prefix)
    }

    pub fn configure_many_by<T, F>(
        &self,
        factory: F,
        prefix: &str,
        comparer: &dyn KeyComparer,
    ) -> Result<Vec<T>>
    where
        T: Configurable,
        F: FnMut() -> T,
    {
        self.snapshot()
            .populator(&self.options)
            .populate_many_by(factory, prefix, comparer)
    }

    pub fn configure_keyed<T, F>(&self, factory: F, prefix: &str) -> Result<Vec<(Option<String>, T)>>
    where
        T: Configurable,
        F: FnMut(Option<&str>) -> T,
    {
        self.snapshot()
            .populator(&self.options)
            .populate_keyed(factory, prefix)
    }

    pub fn configure_keyed_by<T, F>(
        &self,
        factory: F,
        prefix: &str,
        comparer: &dyn KeyComparer,
    ) -> Result<Vec<(Option<String>, T)>>
    where
        T: Configurable,
        F: FnMut(Option<&str>) -> T,
    {
        self.snapshot()
            .populator(&self.options)
            .populate_keyed_by(factory, prefix, comparer)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.sources.iter().map(|source| source.source_id()).collect();
        f.debug_struct("Configuration")
            .field("sources", &ids)
            .field("generation", &self.current.read().generation)
            .finish()
    }
}
