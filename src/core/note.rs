//! On-screen key state.
//!
//! The keyboard covers 25 keys starting at MIDI note 48 (C3). Each key is a
//! `Note` whose visual state mirrors what has been sent to the engine.

/// Number of playable keys.
pub const KEY_COUNT: usize = 25;

/// MIDI note number of key 0.
pub const NOTE_OFFSET: u8 = 48;

// Row of each pitch class within an octave: 0 for white keys, 1 for black.
const OCTAVE_ROWS: [u8; 12] = [0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 1, 0];

/// Visual class a key returns to when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestingClass {
    White,
    Black,
}

impl RestingClass {
    /// Resting class of a key from its position in the octave.
    pub fn for_key(id: usize) -> Self {
        if OCTAVE_ROWS[id % 12] == 1 {
            RestingClass::Black
        } else {
            RestingClass::White
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Idle,
    Pressed,
}

/// Class a key is drawn with right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    White,
    Black,
    Pressed,
}

impl From<RestingClass> for KeyClass {
    fn from(class: RestingClass) -> Self {
        match class {
            RestingClass::White => KeyClass::White,
            RestingClass::Black => KeyClass::Black,
        }
    }
}

/// Map a MIDI note number to a key id, if it falls on the keyboard.
pub fn note_to_key(note_number: u8) -> Option<usize> {
    let id = note_number.checked_sub(NOTE_OFFSET)? as usize;
    (id < KEY_COUNT).then_some(id)
}

/// Map a key id to its MIDI note number.
pub fn key_to_note(id: usize) -> Option<u8> {
    (id < KEY_COUNT).then(|| NOTE_OFFSET + id as u8)
}

#[derive(Debug, Clone)]
pub struct Note {
    id: usize,
    visual_state: VisualState,
    resting_class: RestingClass,
}

impl Note {
    fn new(id: usize) -> Self {
        Self {
            id,
            visual_state: VisualState::Idle,
            resting_class: RestingClass::for_key(id),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual_state
    }

    pub fn resting_class(&self) -> RestingClass {
        self.resting_class
    }

    pub fn class(&self) -> KeyClass {
        match self.visual_state {
            VisualState::Pressed => KeyClass::Pressed,
            VisualState::Idle => self.resting_class.into(),
        }
    }
}

/// Owns the visual state of every key. Pure in-memory state, no I/O.
#[derive(Debug, Clone)]
pub struct NoteRegistry {
    notes: Vec<Note>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self {
            notes: (0..KEY_COUNT).map(Note::new).collect(),
        }
    }

    /// Mark a key pressed. Ids off the keyboard are ignored.
    pub fn note_on(&mut self, id: usize) {
        if let Some(note) = self.notes.get_mut(id) {
            note.visual_state = VisualState::Pressed;
        }
    }

    /// Return a key to its resting class. Ids off the keyboard are ignored.
    pub fn note_off(&mut self, id: usize) {
        if let Some(note) = self.notes.get_mut(id) {
            note.visual_state = VisualState::Idle;
        }
    }

    pub fn get(&self, id: usize) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn pressed_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|n| n.visual_state == VisualState::Pressed)
            .count()
    }
}

impl Default for NoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_note_per_id() {
        let registry = NoteRegistry::new();
        assert_eq!(registry.notes().len(), KEY_COUNT);
        for (i, note) in registry.notes().iter().enumerate() {
            assert_eq!(note.id(), i);
            assert_eq!(note.visual_state(), VisualState::Idle);
        }
    }

    #[test]
    fn resting_classes_follow_octave_layout() {
        let black: Vec<usize> = (0..KEY_COUNT)
            .filter(|&id| RestingClass::for_key(id) == RestingClass::Black)
            .collect();
        assert_eq!(black, vec![1, 3, 6, 8, 10, 13, 15, 18, 20, 22]);
    }

    #[test]
    fn note_off_restores_resting_class() {
        let mut registry = NoteRegistry::new();
        for id in 0..KEY_COUNT {
            let resting = registry.get(id).unwrap().resting_class();
            registry.note_on(id);
            assert_eq!(registry.get(id).unwrap().class(), KeyClass::Pressed);
            registry.note_off(id);
            assert_eq!(registry.get(id).unwrap().class(), KeyClass::from(resting));
            assert_eq!(registry.get(id).unwrap().resting_class(), resting);
        }
    }

    #[test]
    fn note_off_is_idempotent() {
        let mut registry = NoteRegistry::new();
        registry.note_on(7);
        registry.note_off(7);
        let once = registry.get(7).unwrap().class();
        registry.note_off(7);
        assert_eq!(registry.get(7).unwrap().class(), once);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut registry = NoteRegistry::new();
        registry.note_on(KEY_COUNT);
        registry.note_on(usize::MAX);
        registry.note_off(KEY_COUNT + 3);
        assert_eq!(registry.pressed_count(), 0);
        assert!(registry.get(KEY_COUNT).is_none());
    }

    #[test]
    fn key_mapping_is_symmetric_over_keyboard() {
        for id in 0..KEY_COUNT {
            let note = key_to_note(id).unwrap();
            assert_eq!(note, id as u8 + 48);
            assert_eq!(note_to_key(note), Some(id));
        }
        assert_eq!(note_to_key(47), None);
        assert_eq!(note_to_key(73), None);
        assert_eq!(note_to_key(5), None);
        assert_eq!(key_to_note(KEY_COUNT), None);
    }
}
