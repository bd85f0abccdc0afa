use crate::model::{Mark, MarkDef, Span, keys};

/// Link definitions accumulated over one parse pass.
///
/// Seeded with the previous block's definitions so a link's key survives
/// re-parsing, and deduplicated by target: every anchor to the same href
/// within the pass resolves to one key.
pub(crate) struct LinkRegistry {
    defs: Vec<MarkDef>,
}

impl LinkRegistry {
    pub fn seeded(defs: &[MarkDef]) -> Self {
        Self {
            defs: defs.to_vec(),
        }
    }

    /// The def key for an href, reusing an existing definition or minting
    /// a new one.
    pub fn key_for(&mut self, href: &str) -> String {
        if let Some(def) = self.defs.iter().find(|d| d.href == href) {
            return def.key.clone();
        }
        let def = MarkDef::link(keys::generate(), href);
        let key = def.key.clone();
        self.defs.push(def);
        key
    }

    /// The definitions actually referenced by the given spans, in
    /// registration order. Seeded defs no span references any more fall
    /// away here.
    pub fn defs_for(&self, spans: &[Span]) -> Vec<MarkDef> {
        self.defs
            .iter()
            .filter(|def| {
                spans.iter().any(|span| {
                    span.marks
                        .iter()
                        .any(|m| matches!(m, Mark::Def(key) if *key == def.key))
                })
            })
            .cloned()
            .collect()
    }
}
