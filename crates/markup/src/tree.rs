//! Containment tree over a flat span list.

use {crossrelay_common::Span, tracing::trace};

/// One node of an [`EntityTree`]. The root has no span.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub span: Option<&'a Span>,
    pub start: usize,
    pub end: usize,
    /// Indices into the tree's node list, ordered by start offset.
    pub children: Vec<usize>,
}

/// Spans arranged by containment under a synthetic root covering the body.
///
/// Offsets are codepoint indices; `text` slices the body accordingly.
#[derive(Debug)]
pub struct EntityTree<'a> {
    body: &'a str,
    /// Byte offset of every codepoint, plus `body.len()` as a final entry.
    char_offsets: Vec<usize>,
    nodes: Vec<Node<'a>>,
}

impl<'a> EntityTree<'a> {
    /// Build the tree in one pass over the sorted spans.
    ///
    /// Spans that are empty, out of range, or that cross a sibling's boundary
    /// are dropped. Among spans starting at the same offset the longest comes
    /// first and becomes the ancestor; identical ranges nest in sort order.
    #[must_use]
    pub fn build(body: &'a str, spans: &'a [Span]) -> Self {
        let mut char_offsets: Vec<usize> = body.char_indices().map(|(i, _)| i).collect();
        let len = char_offsets.len();
        char_offsets.push(body.len());

        let mut sorted: Vec<&Span> = spans
            .iter()
            .filter(|s| s.start < s.end && s.end <= len)
            .collect();
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.len().cmp(&a.len())));

        let mut nodes = vec![Node {
            span: None,
            start: 0,
            end: len,
            children: Vec::new(),
        }];
        let mut stack: Vec<usize> = vec![0];

        for span in sorted {
            while let Some(&top) = stack.last() {
                if top != 0 && nodes[top].end <= span.start {
                    stack.pop();
                } else {
                    break;
                }
            }
            let parent = stack.last().copied().unwrap_or(0);
            if span.start < nodes[parent].start || span.end > nodes[parent].end {
                trace!(
                    kind = ?span.kind,
                    start = span.start,
                    end = span.end,
                    "dropping span that crosses its parent"
                );
                continue;
            }
            let idx = nodes.len();
            nodes.push(Node {
                span: Some(span),
                start: span.start,
                end: span.end,
                children: Vec::new(),
            });
            nodes[parent].children.push(idx);
            stack.push(idx);
        }

        Self {
            body,
            char_offsets,
            nodes,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node<'a> {
        &self.nodes[0]
    }

    /// # Panics
    /// Panics if `idx` did not come from this tree.
    #[must_use]
    pub fn node(&self, idx: usize) -> &Node<'a> {
        &self.nodes[idx]
    }

    /// Body text between two codepoint offsets.
    #[must_use]
    pub fn text(&self, start: usize, end: usize) -> &'a str {
        let from = self.char_offsets.get(start).copied().unwrap_or(self.body.len());
        let to = self.char_offsets.get(end).copied().unwrap_or(self.body.len());
        &self.body[from..to.max(from)]
    }

    /// Every span that made it into the tree, in depth-first order.
    pub fn spans(&self) -> impl Iterator<Item = &'a Span> + '_ {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![0usize];
        while let Some(idx) = pending.pop() {
            order.push(idx);
            pending.extend(self.nodes[idx].children.iter().rev());
        }
        order.into_iter().filter_map(|idx| self.nodes[idx].span)
    }
}
