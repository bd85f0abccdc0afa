/// An inline annotation on a span of text.
///
/// The three built-in marks need no definition; everything else is a key
/// into the owning block's mark definitions. Only the link kind exists
/// today, so a `Def` key always resolves to a [`MarkDef`] carrying an
/// `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Strong,
    Em,
    Underline,
    Def(String),
}

impl Mark {
    /// The wire name of this mark: the built-in name, or the def key.
    pub fn name(&self) -> &str {
        match self {
            Mark::Strong => "strong",
            Mark::Em => "em",
            Mark::Underline => "underline",
            Mark::Def(key) => key,
        }
    }

    /// Resolve a wire name back to a mark. Anything that is not one of
    /// the built-in names is a def key.
    pub fn from_name(name: &str) -> Mark {
        match name {
            "strong" => Mark::Strong,
            "em" => Mark::Em,
            "underline" => Mark::Underline,
            key => Mark::Def(key.to_string()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Mark::Def(_))
    }
}

/// Out-of-line data referenced by key from spans. Only links exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDef {
    pub key: String,
    pub href: String,
}

impl MarkDef {
    pub fn link(key: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            href: href.into(),
        }
    }
}

/// Mark names in a canonical order, for order-insensitive comparison.
pub fn normalized_mark_names(marks: &[Mark]) -> Vec<&str> {
    let mut names: Vec<&str> = marks.iter().map(Mark::name).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Compare two mark sets ignoring order and duplicates.
pub fn marks_equal(a: &[Mark], b: &[Mark]) -> bool {
    normalized_mark_names(a) == normalized_mark_names(b)
}
