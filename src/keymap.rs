use std::collections::HashMap;

/// Editing actions reachable through multi-key sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceAction {
    MoveToTop, // gg
    Delete,    // dd (current selection)
    DeleteRow, // dr
    DeleteCol, // dc
    Yank,      // yy (current selection)
    YankRow,   // yr
    YankCol,   // yc
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum KeySequence {
    One(char),
    Two(char, char),
}

impl KeySequence {
    fn from_chars(chars: &[char]) -> Option<Self> {
        match chars {
            [a] => Some(KeySequence::One(*a)),
            [a, b] => Some(KeySequence::Two(*a, *b)),
            _ => None,
        }
    }

    fn starts_with(&self, prefix: char) -> bool {
        match self {
            KeySequence::One(a) | KeySequence::Two(a, _) => *a == prefix,
        }
    }
}

/// Result of feeding one key into the sequence table.
pub enum SequenceResult {
    /// A full sequence matched.
    Action(SequenceAction),
    /// The keys so far are a prefix of some sequence; wait for more.
    Pending,
    /// Nothing matches; the caller should handle the key itself.
    Fallthrough,
}

/// Two-key command sequences, vim style.
pub struct CommandTable {
    map: HashMap<KeySequence, SequenceAction>,
}

impl CommandTable {
    pub fn lookup(&self, chars: &[char]) -> SequenceResult {
        let Some(seq) = KeySequence::from_chars(chars) else {
            return SequenceResult::Fallthrough;
        };
        if let Some(action) = self.map.get(&seq) {
            return SequenceResult::Action(*action);
        }
        // A single key can still grow into a two-key sequence.
        if let KeySequence::One(c) = seq {
            if self.map.keys().any(|k| k.starts_with(c) && *k != seq) {
                return SequenceResult::Pending;
            }
        }
        SequenceResult::Fallthrough
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            map: HashMap::from([
                (KeySequence::Two('g', 'g'), SequenceAction::MoveToTop),
                (KeySequence::Two('d', 'd'), SequenceAction::Delete),
                (KeySequence::Two('d', 'r'), SequenceAction::DeleteRow),
                (KeySequence::Two('d', 'c'), SequenceAction::DeleteCol),
                (KeySequence::Two('y', 'y'), SequenceAction::Yank),
                (KeySequence::Two('y', 'r'), SequenceAction::YankRow),
                (KeySequence::Two('y', 'c'), SequenceAction::YankCol),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_key_sequence() {
        let table = CommandTable::default();
        assert!(matches!(table.lookup(&['d']), SequenceResult::Pending));
        assert!(matches!(
            table.lookup(&['d', 'r']),
            SequenceResult::Action(SequenceAction::DeleteRow)
        ));
    }

    #[test]
    fn test_fallthrough() {
        let table = CommandTable::default();
        assert!(matches!(table.lookup(&['j']), SequenceResult::Fallthrough));
        assert!(matches!(
            table.lookup(&['d', 'z']),
            SequenceResult::Fallthrough
        ));
    }
}
