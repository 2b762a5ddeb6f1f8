use math::math::vector::vec2;
use serde::{Deserialize, Serialize};

/// The input a character is simulated with.
///
/// The target is the cursor relative to the character,
/// it is integer based like on the wire and defaults to
/// pointing upwards, so it is never `(0, 0)` unless set so.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterInput {
    /// -1 = left, 0 = none, 1 = right
    pub direction: i32,
    pub target_x: i32,
    pub target_y: i32,
    pub jump: bool,
    pub hook: bool,
}

impl Default for CharacterInput {
    fn default() -> Self {
        Self {
            direction: 0,
            target_x: 0,
            target_y: -1,
            jump: false,
            hook: false,
        }
    }
}

impl CharacterInput {
    /// Sets the direction, any value is reduced to its sign.
    pub fn set_direction(&mut self, dir: i32) {
        self.direction = dir.signum();
    }

    pub fn set_target(&mut self, x: i32, y: i32) {
        self.target_x = x;
        self.target_y = y;
    }

    pub fn target(&self) -> vec2 {
        vec2::new(self.target_x as f32, self.target_y as f32)
    }
}

#[cfg(test)]
mod test {
    use super::CharacterInput;

    #[test]
    fn default_target_points_up() {
        let inp = CharacterInput::default();
        assert_eq!((inp.target_x, inp.target_y), (0, -1));
    }

    #[test]
    fn direction_is_a_sign() {
        let mut inp = CharacterInput::default();
        inp.set_direction(-20);
        assert_eq!(inp.direction, -1);
        inp.set_direction(3);
        assert_eq!(inp.direction, 1);
        inp.set_direction(0);
        assert_eq!(inp.direction, 0);
    }

    #[test]
    fn target_vector() {
        let mut inp = CharacterInput::default();
        inp.set_target(-3, 7);
        assert_eq!((inp.target_x, inp.target_y), (-3, 7));
        assert_eq!(inp.target().x, -3.0);
        assert_eq!(inp.target().y, 7.0);
    }
}
