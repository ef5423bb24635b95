//! Name index over object and response definitions.
//!
//! Every definition is addressed by its document and raw schema name, so an
//! object and a response may share a name. The index stores
//! the definition with its declared identifier, computed exactly once, so
//! declarations and references to them always agree and the caser is never
//! re-applied to its own output.

use std::collections::HashMap;

use tracing::warn;
use vkgen_define::{Document, NamedDefinition, Reference, SchemaSet};

use crate::casing::Caser;
use crate::config::GeneratorConfig;
use crate::errors::LoweringError;
use crate::output::OutputUnit;

/// Which document a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Object,
    Response,
}

impl DefinitionKind {
    /// The output unit that declares definitions of this kind.
    pub fn unit(self) -> OutputUnit {
        match self {
            DefinitionKind::Object => OutputUnit::Objects,
            DefinitionKind::Response => OutputUnit::Responses,
        }
    }
}

impl From<Document> for DefinitionKind {
    fn from(document: Document) -> Self {
        match document {
            Document::Objects => DefinitionKind::Object,
            Document::Responses => DefinitionKind::Response,
        }
    }
}

/// One indexed definition.
#[derive(Debug, Clone)]
pub struct IndexEntry<'a> {
    pub definition: &'a NamedDefinition,
    pub kind: DefinitionKind,
    /// Declared identifier, cased once.
    pub ident: String,
}

/// (kind, raw name) -> definition lookup for one schema.
#[derive(Debug)]
pub struct SchemaIndex<'a> {
    entries: HashMap<(DefinitionKind, &'a str), IndexEntry<'a>>,
}

impl<'a> SchemaIndex<'a> {
    /// Indexes objects, then responses. A raw name repeated within one
    /// document keeps its first definition and a warning is logged.
    pub fn build(schema: &'a SchemaSet, caser: &Caser, config: &GeneratorConfig) -> Self {
        let mut entries = HashMap::with_capacity(schema.objects.len() + schema.responses.len());

        for definition in &schema.objects {
            let ident = match config.object_renames.get(&definition.name) {
                Some(renamed) => renamed.clone(),
                None => caser.case(&definition.name),
            };
            insert(&mut entries, definition, DefinitionKind::Object, ident);
        }

        for definition in &schema.responses {
            let mut ident = caser.case(&definition.name);
            if !ident.ends_with("Response") {
                ident.push_str("Response");
            }
            insert(&mut entries, definition, DefinitionKind::Response, ident);
        }

        Self { entries }
    }

    pub fn get(&self, kind: DefinitionKind, name: &str) -> Option<&IndexEntry<'a>> {
        self.entries
            .iter()
            .find(|((entry_kind, entry_name), _)| *entry_kind == kind && *entry_name == name)
            .map(|(_, entry)| entry)
    }

    /// Looks up `reference` in its own document, failing with
    /// [`LoweringError::UnresolvedReference`].
    pub fn lookup(&self, reference: &Reference) -> Result<&IndexEntry<'a>, LoweringError> {
        self.get(reference.document.into(), &reference.name)
            .ok_or_else(|| LoweringError::UnresolvedReference {
                name: reference.name.clone(),
            })
    }

    /// Declared identifier for a referenced definition.
    pub fn ident(&self, reference: &Reference) -> Result<&str, LoweringError> {
        self.lookup(reference).map(|entry| entry.ident.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn insert<'a>(
    entries: &mut HashMap<(DefinitionKind, &'a str), IndexEntry<'a>>,
    definition: &'a NamedDefinition,
    kind: DefinitionKind,
    ident: String,
) {
    let key = (kind, definition.name.as_str());
    if entries.contains_key(&key) {
        warn!(name = %definition.name, ?kind, "duplicate definition name, keeping the first");
        return;
    }
    entries.insert(
        key,
        IndexEntry {
            definition,
            kind,
            ident,
        },
    );
}
