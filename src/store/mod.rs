//! Durable cart store
//!
//! Wraps the cart aggregate with persistence to a single durable key (a
//! JSON file in this rendition), rewritten after every mutation. Storage
//! failures are never surfaced: a failed read starts an empty cart, a
//! failed write leaves the in-memory state authoritative for the session
//! and the next mutation re-attempts persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::domain::aggregates::cart::{Cart, CartError, CartLine, CartSnapshot, LineKey};

pub trait CartStorage: Send {
    fn load(&self) -> anyhow::Result<Vec<CartLine>>;
    fn save(&self, lines: &[CartLine]) -> anyhow::Result<()>;
}

/// File-backed storage holding one JSON array of cart lines.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> anyhow::Result<Vec<CartLine>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, lines: &[CartLine]) -> anyhow::Result<()> {
        std::fs::write(&self.path, serde_json::to_string(lines)?)?;
        Ok(())
    }
}

/// In-memory storage, used where durability is not wanted (tests, previews).
#[derive(Default)]
pub struct MemoryStorage {
    lines: Mutex<Vec<CartLine>>,
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> anyhow::Result<Vec<CartLine>> {
        Ok(self.lines.lock().map(|l| l.clone()).unwrap_or_default())
    }

    fn save(&self, lines: &[CartLine]) -> anyhow::Result<()> {
        if let Ok(mut stored) = self.lines.lock() {
            *stored = lines.to_vec();
        }
        Ok(())
    }
}

/// The buyer's cart, constructed once at application start and passed by
/// reference to consumers. Every mutation goes through the aggregate and is
/// then persisted.
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn CartStorage>,
}

impl CartStore {
    pub fn open(storage: Box<dyn CartStorage>, currency: &str) -> Self {
        let lines = match storage.load() {
            Ok(lines) => lines,
            Err(e) => {
                warn!("cart storage unreadable, starting empty: {e}");
                vec![]
            }
        };
        Self { cart: Cart::from_lines(lines, currency), storage }
    }

    pub fn lines(&self) -> &[CartLine] { self.cart.lines() }
    pub fn line_count(&self) -> usize { self.cart.line_count() }
    pub fn is_empty(&self) -> bool { self.cart.is_empty() }
    pub fn snapshot(&self) -> CartSnapshot { self.cart.snapshot() }

    pub fn add(&mut self, line: CartLine) {
        self.cart.add(line);
        self.persist();
    }

    pub fn update_quantity(&mut self, key: &LineKey, quantity: i32) -> Result<(), CartError> {
        self.cart.update_quantity(key, quantity)?;
        self.persist();
        Ok(())
    }

    pub fn remove(&mut self, key: &LineKey) {
        self.cart.remove(key);
        self.persist();
    }

    /// Called only after a confirmed, server-verified payment.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(self.cart.lines()) {
            warn!("cart persistence failed, keeping in-memory state: {e}");
        }
    }
}
