//! The string table shared by all codes of one stream.
use crate::alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use crate::{Code, FIRST_LEARNED, MAX_ENTRIES};
use core::fmt;

/// Every byte value, so that literal codes can be handed out as slices.
const LITERALS: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    table
};

/// A fixed capacity table of strings keyed by their code.
///
/// Codes `0..=255` always denote the single byte of the same value. Code `256` is never assigned,
/// learned strings start at `257`. Entries are never removed or replaced; once all codes up to
/// `511` are handed out the table is frozen.
pub struct Dictionary {
    /// Learned strings, the entry at index `i` has code `FIRST_LEARNED + i`.
    learned: Vec<Box<[u8]>>,
    /// Exact string to code, for learned strings only.
    index: BTreeMap<Box<[u8]>, Code>,
}

/// Signals that a string could not be inserted since all codes are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryFull;

impl Dictionary {
    /// Create a table containing only the literal byte codes.
    pub fn new() -> Self {
        Dictionary {
            learned: Vec::with_capacity(MAX_ENTRIES - usize::from(FIRST_LEARNED)),
            index: BTreeMap::new(),
        }
    }

    /// Assign `value` to the next free code.
    ///
    /// The table is left untouched when it is full. Inserting a string that is already known
    /// still consumes a code but lookups keep resolving to the earlier one.
    pub fn insert(&mut self, value: &[u8]) -> Result<Code, DictionaryFull> {
        let code = self.next_code();
        if usize::from(code) >= MAX_ENTRIES {
            return Err(DictionaryFull);
        }

        let value: Box<[u8]> = value.into();
        log::trace!("learned [{}] = {{{}}}", code, value.escape_ascii());
        self.index.entry(value.clone()).or_insert(code);
        self.learned.push(value);
        Ok(code)
    }

    /// Find the code of the entry that is exactly equal to `value`.
    pub fn lookup(&self, value: &[u8]) -> Option<Code> {
        match value {
            [] => None,
            [byte] => Some(Code::from(*byte)),
            _ => self.index.get(value).copied(),
        }
    }

    /// The string stored under `code`, if any.
    pub fn get(&self, code: Code) -> Option<&[u8]> {
        match code {
            0..=255 => Some(core::slice::from_ref(&LITERALS[usize::from(code)])),
            _ if code < FIRST_LEARNED => None,
            _ => self
                .learned
                .get(usize::from(code - FIRST_LEARNED))
                .map(|value| &**value),
        }
    }

    /// The code the next inserted string would receive.
    pub fn next_code(&self) -> Code {
        FIRST_LEARNED + self.learned.len() as Code
    }

    /// The number of learned strings, not counting the literal codes.
    pub fn len(&self) -> usize {
        self.learned.len()
    }

    /// If no string has been learned yet.
    pub fn is_empty(&self) -> bool {
        self.learned.is_empty()
    }

    /// If every code has been assigned.
    pub fn is_full(&self) -> bool {
        usize::from(self.next_code()) >= MAX_ENTRIES
    }

    /// Iterate over all learned strings in code order.
    pub fn learned(&self) -> impl Iterator<Item = (Code, &[u8])> + '_ {
        self.learned
            .iter()
            .enumerate()
            .map(|(idx, value)| (FIRST_LEARNED + idx as Code, &**value))
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::new()
    }
}

impl fmt::Display for DictionaryFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} codes of the dictionary are assigned", MAX_ENTRIES)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DictionaryFull {}
