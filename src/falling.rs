use crate::config::Difficulty;

/// Leftmost and rightmost spawn columns, as a percentage of the playfield width
pub const SLOT_MIN: f64 = 5.0;
pub const SLOT_MAX: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemState {
    Spawned,
    Falling,
    Matched,
    Expired,
    Cleared,
}

impl ItemState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Matched | ItemState::Expired | ItemState::Cleared)
    }
}

/// One descending token
#[derive(Clone, Debug)]
pub struct FallingItem {
    pub id: u64,
    text: String,
    display_text: String,
    position: f64,
    horizontal_slot: f64,
    speed: f64,
    matched_prefix: String,
    state: ItemState,
}

impl FallingItem {
    pub fn new(id: u64, display_text: impl Into<String>, horizontal_slot: f64, speed: f64) -> Self {
        let display_text = display_text.into();
        Self {
            id,
            text: display_text.to_lowercase(),
            display_text,
            position: 0.0,
            horizontal_slot: horizontal_slot.clamp(0.0, 99.999),
            speed: speed.max(0.0),
            matched_prefix: String::new(),
            state: ItemState::Spawned,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn horizontal_slot(&self) -> f64 {
        self.horizontal_slot
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn matched_prefix(&self) -> &str {
        &self.matched_prefix
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Spawned -> Falling. Other states are left alone.
    pub fn start_falling(&mut self) {
        if self.state == ItemState::Spawned {
            self.state = ItemState::Falling;
        }
    }

    /// Moves the item down one tick. Returns true when this tick took it past the floor.
    pub fn advance(&mut self, floor: f64) -> bool {
        if self.state != ItemState::Falling {
            return false;
        }
        self.position += self.speed;
        if self.position >= floor {
            self.state = ItemState::Expired;
            self.matched_prefix.clear();
            return true;
        }
        false
    }

    /// Records how much of the buffer this item agrees with. `buffer` must already be lowercase.
    pub fn update_prefix(&mut self, buffer: &str) -> bool {
        if !buffer.is_empty() && self.text.starts_with(buffer) {
            self.matched_prefix.clear();
            self.matched_prefix.push_str(buffer);
            true
        } else {
            self.matched_prefix.clear();
            buffer.is_empty()
        }
    }

    pub fn clear_prefix(&mut self) {
        self.matched_prefix.clear();
    }

    pub fn mark_matched(&mut self) {
        if self.is_active() {
            self.state = ItemState::Matched;
        }
    }

    pub fn mark_cleared(&mut self) {
        if self.is_active() {
            self.state = ItemState::Cleared;
            self.matched_prefix.clear();
        }
    }

    /// The part of the display text not yet typed
    pub fn remaining_display(&self) -> &str {
        let typed = self.matched_prefix.chars().count();
        match self.display_text.char_indices().nth(typed) {
            Some((idx, _)) => &self.display_text[idx..],
            None => "",
        }
    }

    pub fn typed_display(&self) -> &str {
        let rest = self.remaining_display().len();
        &self.display_text[..self.display_text.len() - rest]
    }
}

/// Fall speed in units per tick for an item spawned at this difficulty and level
pub fn item_speed(difficulty: Difficulty, level: u32) -> f64 {
    difficulty.base_speed() * (1.0 + f64::from(level.max(1) - 1) * 0.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling(text: &str, speed: f64) -> FallingItem {
        let mut item = FallingItem::new(1, text, 50.0, speed);
        item.start_falling();
        item
    }

    #[test]
    fn test_new_item_is_spawned_at_top() {
        let item = FallingItem::new(3, "Hello", 20.0, 1.0);
        assert_eq!(item.state(), ItemState::Spawned);
        assert_eq!(item.position(), 0.0);
        assert_eq!(item.matched_prefix(), "");
        assert_eq!(item.text(), "hello");
        assert_eq!(item.display_text(), "Hello");
        assert!(item.is_active());
    }

    #[test]
    fn test_spawned_item_does_not_move() {
        let mut item = FallingItem::new(1, "a", 10.0, 2.0);
        assert!(!item.advance(100.0));
        assert_eq!(item.position(), 0.0);
    }

    #[test]
    fn test_expires_exactly_at_floor() {
        let mut item = falling("cat", 1.0);
        for tick in 1..100 {
            assert!(!item.advance(100.0), "expired early at tick {tick}");
            assert_eq!(item.state(), ItemState::Falling);
        }
        assert!(item.advance(100.0));
        assert_eq!(item.state(), ItemState::Expired);
        assert!(!item.is_active());
        // terminal items stay put
        assert!(!item.advance(100.0));
        assert_eq!(item.position(), 100.0);
    }

    #[test]
    fn test_prefix_tracking() {
        let mut item = falling("Rust", 1.0);
        assert!(item.update_prefix("ru"));
        assert_eq!(item.matched_prefix(), "ru");
        assert_eq!(item.typed_display(), "Ru");
        assert_eq!(item.remaining_display(), "st");
        assert!(!item.update_prefix("rx"));
        assert_eq!(item.matched_prefix(), "");
        assert_eq!(item.remaining_display(), "Rust");
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut item = falling("dog", 1.0);
        item.mark_matched();
        item.mark_cleared();
        assert_eq!(item.state(), ItemState::Matched);

        let mut other = falling("dog", 1.0);
        other.mark_cleared();
        other.mark_matched();
        assert_eq!(other.state(), ItemState::Cleared);
    }

    #[test]
    fn test_speed_scales_with_level() {
        assert_eq!(item_speed(Difficulty::Medium, 1), 1.0);
        assert!((item_speed(Difficulty::Medium, 6) - 2.0).abs() < 1e-9);
        assert_eq!(item_speed(Difficulty::Easy, 1), 0.5);
        assert!(item_speed(Difficulty::Insane, 3) > item_speed(Difficulty::Hard, 3));
    }

    #[test]
    fn test_negative_speed_is_clamped() {
        let item = FallingItem::new(1, "x", 150.0, -3.0);
        assert_eq!(item.speed(), 0.0);
        assert!(item.horizontal_slot() < 100.0);
    }
}
