/// Back/forward trail of highlighted nodes.
#[derive(Clone, Debug, Default)]
pub struct SelectionHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl SelectionHistory {
    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|cursor| self.entries.get(cursor))
            .map(String::as_str)
    }

    /// Records `id` after the current entry, dropping any forward entries. Returns
    /// `false` when `id` already is the current entry.
    pub fn push(&mut self, id: &str) -> bool {
        if self.current() == Some(id) {
            return false;
        }

        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(id.to_owned());
        self.cursor = Some(self.entries.len() - 1);
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    pub fn back(&mut self) -> Option<&str> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor).map(String::as_str)
    }

    pub fn forward(&mut self) -> Option<&str> {
        let cursor = self.cursor? + 1;
        let entry = self.entries.get(cursor)?;
        self.cursor = Some(cursor);
        Some(entry.as_str())
    }
}
