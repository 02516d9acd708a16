// ---------------------------------------------------------------------------
// Navigation history: the in-process stand-in for the browser location
// ---------------------------------------------------------------------------

/// Query strings visited this session, with a cursor on the current one.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    transitions: u64,
}

impl History {
    pub fn new(initial: String) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            transitions: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    /// Commit a new location. Forward entries are discarded.
    pub fn push(&mut self, query: String) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(query);
        self.cursor = self.entries.len() - 1;
        self.transitions += 1;
    }

    /// Rewrite the current entry in place; not a transition.
    pub fn replace(&mut self, query: String) {
        self.entries[self.cursor] = query;
    }

    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.transitions += 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.transitions += 1;
        Some(self.current())
    }

    /// Number of committed page transitions.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_and_forward() {
        let mut h = History::new("n=1".into());
        assert_eq!(h.back(), None);
        h.push("n=2".into());
        h.push("n=3".into());
        assert_eq!(h.back(), Some("n=2"));
        assert_eq!(h.back(), Some("n=1"));
        assert_eq!(h.forward(), Some("n=2"));
        assert_eq!(h.transitions(), 5);

        h.push("n=9".into());
        assert_eq!(h.forward(), None);
        assert_eq!(h.len(), 3);
        assert_eq!(h.current(), "n=9");

        h.replace("n=9&zoom=fit".into());
        assert_eq!(h.transitions(), 6);
        assert_eq!(h.back(), Some("n=2"));
        assert_eq!(h.forward(), Some("n=9&zoom=fit"));
    }
}
