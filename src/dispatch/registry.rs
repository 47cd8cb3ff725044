//! Encoder backend registry.
//!
//! Two backend contracts exist side by side: [`SegmentEncoder`] takes the
//! whole segment list, [`FlatEncoder`] takes one resolved byte buffer.
//! A [`Registry`] maps each canonical symbology to at most one backend.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::hibc;
use crate::backends;
use crate::error::{Result, Warning};
use crate::symbol::{Segment, Symbol};
use crate::symbology::Symbology;

/// Backend taking the full segment list, each with its ECI.
pub trait SegmentEncoder: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Append rows to the symbol's grid and set its text.
    fn encode_segs(&self, symbol: &mut Symbol, segs: &[Segment]) -> Result<Option<Warning>>;
}

/// Backend taking one pre-resolved byte buffer.
pub trait FlatEncoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn encode(&self, symbol: &mut Symbol, source: &[u8]) -> Result<Option<Warning>>;
}

/// A registered backend under one of the two contracts.
#[derive(Clone)]
pub enum Backend {
    Segments(Arc<dyn SegmentEncoder>),
    Flat(Arc<dyn FlatEncoder>),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Segments(b) => b.name(),
            Backend::Flat(b) => b.name(),
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Segments(b) => write!(f, "Segments({})", b.name()),
            Backend::Flat(b) => write!(f, "Flat({})", b.name()),
        }
    }
}

/// Symbology to backend map.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    backends: HashMap<Symbology, Backend>,
}

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::empty();
    backends::register_builtin(&mut registry);
    registry
});

impl Registry {
    /// A registry with no backends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A copy of the built-in registry, ready for extra registrations.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Shared built-in registry.
    pub fn shared() -> &'static Registry {
        &BUILTIN
    }

    /// Register `backend` for `symbology`, replacing any previous one.
    pub fn register(&mut self, symbology: Symbology, backend: Backend) -> &mut Self {
        self.backends.insert(symbology, backend);
        self
    }

    pub fn register_segments(
        &mut self,
        symbology: Symbology,
        encoder: impl SegmentEncoder + 'static,
    ) -> &mut Self {
        self.register(symbology, Backend::Segments(Arc::new(encoder)))
    }

    pub fn register_flat(&mut self, symbology: Symbology, encoder: impl FlatEncoder + 'static) -> &mut Self {
        self.register(symbology, Backend::Flat(Arc::new(encoder)))
    }

    pub fn get(&self, symbology: Symbology) -> Option<&Backend> {
        self.backends.get(&symbology)
    }

    pub fn contains(&self, symbology: Symbology) -> bool {
        self.backends.contains_key(&symbology)
    }

    /// `true` if `symbology` has a backend of its own or, for HIBC
    /// variants, the wrapped symbology has one.
    pub fn has_encoder(&self, symbology: Symbology) -> bool {
        self.contains(hibc::target(symbology).unwrap_or(symbology))
    }

    /// Registered symbologies in id order.
    pub fn symbologies(&self) -> Vec<Symbology> {
        let mut list: Vec<Symbology> = self.backends.keys().copied().collect();
        list.sort();
        list
    }
}
