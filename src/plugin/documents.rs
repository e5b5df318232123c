//! A small persisted document store and the plugins built on it.
//!
//! Documents live in a pretty-printed JSON file.  Queries rank documents by
//! cosine similarity of lower-cased alphanumeric term counts, which is enough
//! to pull a relevant note into a prompt without an embedding service.
//!
//! - `-dbstore <text>` stores a document
//! - `-dbquery <question>` prepends the best matching document to the prompt
//! - `-dbclear` drops every document
//! - `-dbembed` stores the contents of the embed file

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::plugin::{Plugin, PluginContext, PluginOutcome, argument};

/// Number of characters of the top document shown by `-dbquery`.
const SNIPPET_CHARS: usize = 200;

/// Store shared between the document plugins.
pub type DocumentStoreHandle = Arc<Mutex<DocumentStore>>;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Random v4 identifier assigned when the document is stored.
    pub id: Uuid,

    /// The stored text, verbatim.
    pub text: String,

    /// Where the text came from: `manual` or `embed_file`.
    pub source: String,
}

#[derive(Serialize, Deserialize)]
struct DocumentFile {
    version: u8,
    documents: Vec<Document>,
}

/// File-backed document collection.
///
/// The backing file is read on first use; a missing file is an empty store.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    documents: Vec<Document>,
    loaded: bool,
}

impl DocumentStore {
    /// Creates a store backed by `path`.  Nothing is read until first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            documents: Vec::new(),
            loaded: false,
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of stored documents.
    pub fn len(&mut self) -> Result<usize> {
        self.ensure_loaded()?;
        Ok(self.documents.len())
    }

    /// Returns true if no document is stored.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Stores `text` and persists the collection.
    pub fn add(&mut self, text: impl Into<String>, source: impl Into<String>) -> Result<Uuid> {
        self.ensure_loaded()?;
        let document = Document {
            id: Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
        };
        let id = document.id;
        self.documents.push(document);
        if let Err(err) = self.save() {
            self.documents.pop();
            return Err(err);
        }
        debug!(id = %id, path = %self.path.display(), "stored document");
        Ok(id)
    }

    /// Returns the document most similar to `query`.
    ///
    /// `None` only when the store is empty.  Ties go to the earlier document.
    pub fn query(&mut self, query: &str) -> Result<Option<&Document>> {
        self.ensure_loaded()?;
        let wanted = term_counts(query);
        let mut best: Option<(f64, &Document)> = None;
        for document in &self.documents {
            let score = cosine(&wanted, &term_counts(&document.text));
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, document));
            }
        }
        Ok(best.map(|(_, document)| document))
    }

    /// Removes the backing file and drops every document.
    ///
    /// On failure the in-memory documents are left untouched.
    pub fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(Error::io("failed to remove document store", err)),
        }
        self.documents.clear();
        self.loaded = true;
        Ok(())
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.loaded = true;
                return Ok(());
            }
            Err(err) => return Err(Error::io("failed to open document store", err)),
        };
        let stored: DocumentFile = from_reader(BufReader::new(file)).map_err(|err| {
            Error::serialization("failed to parse document store", Some(Box::new(err)))
        })?;
        if stored.version != 1 {
            return Err(Error::document(format!(
                "unsupported document store version {}",
                stored.version
            )));
        }
        self.documents = stored.documents;
        self.loaded = true;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create document store directory", err))?;
        }
        let file = File::create(&self.path)
            .map_err(|err| Error::io("failed to create document store", err))?;
        let stored = DocumentFile {
            version: 1,
            documents: self.documents.clone(),
        };
        to_writer_pretty(BufWriter::new(file), &stored).map_err(|err| {
            Error::serialization("failed to serialize document store", Some(Box::new(err)))
        })
    }
}

fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for term in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
    {
        *counts.entry(term.to_lowercase()).or_insert(0.0) += 1.0;
    }
    counts
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, x)| b.get(term).map(|y| x * y))
        .sum();
    let norm = |v: &HashMap<String, f64>| v.values().map(|x| x * x).sum::<f64>().sqrt();
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

fn lock(store: &DocumentStoreHandle) -> Result<std::sync::MutexGuard<'_, DocumentStore>> {
    store
        .lock()
        .map_err(|_| Error::document("document store lock poisoned"))
}

fn report(ctx: &mut PluginContext<'_>, command: &str, err: &Error) {
    warn!(command, error = %err, "document store failure");
    ctx.renderer.print_error(&err.to_string());
}

////////////////////////////////////////// -dbstore //////////////////////////////////////////

/// `-dbstore <text>`: stores text in the document store.
pub struct StoreDocument {
    store: DocumentStoreHandle,
}

impl StoreDocument {
    /// Creates the plugin over a shared store.
    pub fn new(store: DocumentStoreHandle) -> Self {
        Self { store }
    }
}

impl Plugin for StoreDocument {
    fn command(&self) -> &str {
        "-dbstore"
    }

    fn description(&self) -> &str {
        "store text in the document store"
    }

    fn run(&self, input: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome {
        let Some(text) = argument(input) else {
            ctx.renderer.print_info("Usage: -dbstore <text>");
            return PluginOutcome::Terminate;
        };
        match lock(&self.store).and_then(|mut store| store.add(text, "manual")) {
            Ok(id) => ctx.renderer.print_info(&format!("Stored doc ID={id}")),
            Err(err) => report(ctx, self.command(), &err),
        }
        PluginOutcome::Terminate
    }
}

////////////////////////////////////////// -dbquery //////////////////////////////////////////

/// `-dbquery <question>`: asks the question with the best matching document attached.
pub struct DocumentQuery {
    store: DocumentStoreHandle,
}

impl DocumentQuery {
    /// Creates the plugin over a shared store.
    pub fn new(store: DocumentStoreHandle) -> Self {
        Self { store }
    }
}

impl Plugin for DocumentQuery {
    fn command(&self) -> &str {
        "-dbquery"
    }

    fn description(&self) -> &str {
        "ask with the most relevant stored document attached"
    }

    fn run(&self, input: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome {
        let Some(question) = argument(input) else {
            ctx.renderer.print_info("Usage: -dbquery <question>");
            return PluginOutcome::Terminate;
        };
        let best = lock(&self.store).and_then(|mut store| {
            Ok(store
                .query(question)?
                .map(|document| (document.id, document.text.clone())))
        });
        match best {
            Ok(Some((id, text))) => {
                let snippet = text.chars().take(SNIPPET_CHARS).collect::<String>();
                ctx.renderer
                    .print_info(&format!("Top doc ID={id}, snippet:\n{snippet}..."));
                PluginOutcome::Continue(format!(
                    "{question}\n\n-----\nRelevant doc:\n{text}\n-----\n"
                ))
            }
            Ok(None) => {
                ctx.renderer.print_info("No documents found in the DB!");
                PluginOutcome::Terminate
            }
            Err(err) => {
                report(ctx, self.command(), &err);
                PluginOutcome::Terminate
            }
        }
    }
}

////////////////////////////////////////// -dbclear //////////////////////////////////////////

/// `-dbclear`: empties the document store.
pub struct DocumentClear {
    store: DocumentStoreHandle,
}

impl DocumentClear {
    /// Creates the plugin over a shared store.
    pub fn new(store: DocumentStoreHandle) -> Self {
        Self { store }
    }
}

impl Plugin for DocumentClear {
    fn command(&self) -> &str {
        "-dbclear"
    }

    fn description(&self) -> &str {
        "delete every stored document"
    }

    fn run(&self, _: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome {
        match lock(&self.store).and_then(|mut store| store.clear()) {
            Ok(()) => ctx.renderer.print_info("Document store cleared!"),
            Err(err) => report(ctx, self.command(), &err),
        }
        PluginOutcome::Terminate
    }
}

////////////////////////////////////////// -dbembed //////////////////////////////////////////

/// `-dbembed`: stores the contents of the embed file as one document.
pub struct DocumentEmbed {
    store: DocumentStoreHandle,
    file: PathBuf,
}

impl DocumentEmbed {
    /// Creates the plugin over a shared store, reading `file` on each run.
    pub fn new(store: DocumentStoreHandle, file: impl Into<PathBuf>) -> Self {
        Self {
            store,
            file: file.into(),
        }
    }
}

impl Plugin for DocumentEmbed {
    fn command(&self) -> &str {
        "-dbembed"
    }

    fn description(&self) -> &str {
        "store the contents of the embed file"
    }

    fn run(&self, _: &str, ctx: &mut PluginContext<'_>) -> PluginOutcome {
        let name = self.file.display();
        let content = match fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                ctx.renderer.print_info(&format!("No {name} found!"));
                return PluginOutcome::Terminate;
            }
            Err(err) => {
                report(ctx, self.command(), &Error::io("failed to read embed file", err));
                return PluginOutcome::Terminate;
            }
        };
        let content = content.trim();
        if content.is_empty() {
            ctx.renderer.print_info(&format!("{name} is empty!"));
            return PluginOutcome::Terminate;
        }
        match lock(&self.store).and_then(|mut store| store.add(content, "embed_file")) {
            Ok(id) => ctx
                .renderer
                .print_info(&format!("Embedded content from {name} => doc ID={id}")),
            Err(err) => report(ctx, self.command(), &err),
        }
        PluginOutcome::Terminate
    }
}
