use crate::model::{Mark, Span, merge_spans};

/// One `(text, marks)` run collected while walking a surface. Marks are
/// the inherited context at the point the text appeared.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// The unmarked `\n\n` separator between structural children.
    pub fn paragraph_separator() -> Self {
        Self::new("\n\n", Vec::new())
    }
}

/// Coalesce a fragment list into spans: consecutive fragments with equal
/// (order-normalized) mark sets merge into one span, so no two adjacent
/// spans ever share a mark set. Always yields at least one span.
pub(crate) fn coalesce(fragments: Vec<Fragment>) -> Vec<Span> {
    merge_spans(
        fragments
            .into_iter()
            .map(|f| Span::new(f.text, f.marks))
            .collect(),
    )
}
