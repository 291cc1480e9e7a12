//! Change events broadcast after each committed mutation.

/// What kind of mutation committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEventKind {
    /// A fresh game was dealt.
    Configured,
    /// Cards moved from stock to waste.
    Drawn,
    /// Waste recycled into the stock (with its auto-draw).
    Recycled,
    /// A card or run was relocated between piles.
    Moved,
    /// The previous board was restored.
    Undone,
    /// A remote snapshot was adopted wholesale.
    RemoteAdopted,
}

impl GameEventKind {
    /// Wire key for the event kind.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            GameEventKind::Configured => "configured",
            GameEventKind::Drawn => "drawn",
            GameEventKind::Recycled => "recycled",
            GameEventKind::Moved => "moved",
            GameEventKind::Undone => "undone",
            GameEventKind::RemoteAdopted => "remote_adopted",
        }
    }
}

/// One committed mutation, identified by the revision it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameEvent {
    pub revision: u64,
    pub kind: GameEventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_keys() {
        assert_eq!(GameEventKind::Configured.key(), "configured");
        assert_eq!(GameEventKind::Recycled.key(), "recycled");
        assert_eq!(GameEventKind::RemoteAdopted.key(), "remote_adopted");
    }
}
