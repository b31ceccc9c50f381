//! Direction classes and keypad geometry
//!
//! The keypad is laid out as
//!
//! ```text
//! 1 2 3
//! 4 5 6
//! 7 8 9
//!   0
//! ```
//!
//! with columns counted from the left and rows from the bottom, so moving up
//! the keypad is a positive vertical delta.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Geometric relation between two consecutive PIN digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DirectionClass {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "LD")]
    LeftDown,
    #[serde(rename = "LU")]
    LeftUp,
    #[serde(rename = "RD")]
    RightDown,
    #[serde(rename = "RU")]
    RightUp,
    /// Same key pressed twice
    #[serde(rename = "S")]
    Same,
}

impl DirectionClass {
    /// Every class, in label order L, R, D, U, LD, LU, RD, RU, S
    pub const ALL: [DirectionClass; 9] = [
        DirectionClass::Left,
        DirectionClass::Right,
        DirectionClass::Down,
        DirectionClass::Up,
        DirectionClass::LeftDown,
        DirectionClass::LeftUp,
        DirectionClass::RightDown,
        DirectionClass::RightUp,
        DirectionClass::Same,
    ];

    /// Short label used in stores and tables
    pub fn label(self) -> &'static str {
        match self {
            DirectionClass::Left => "L",
            DirectionClass::Right => "R",
            DirectionClass::Down => "D",
            DirectionClass::Up => "U",
            DirectionClass::LeftDown => "LD",
            DirectionClass::LeftUp => "LU",
            DirectionClass::RightDown => "RD",
            DirectionClass::RightUp => "RU",
            DirectionClass::Same => "S",
        }
    }

    /// Class of a keypad move from its sign pattern
    ///
    /// # Example
    /// ```
    /// use imu_pin::DirectionClass;
    ///
    /// assert_eq!(DirectionClass::from_delta(1, -2), DirectionClass::RightDown);
    /// assert_eq!(DirectionClass::from_delta(0, 0), DirectionClass::Same);
    /// ```
    pub fn from_delta(dx: i32, dy: i32) -> Self {
        use std::cmp::Ordering::*;

        match (dx.cmp(&0), dy.cmp(&0)) {
            (Less, Equal) => DirectionClass::Left,
            (Greater, Equal) => DirectionClass::Right,
            (Equal, Less) => DirectionClass::Down,
            (Equal, Greater) => DirectionClass::Up,
            (Less, Less) => DirectionClass::LeftDown,
            (Less, Greater) => DirectionClass::LeftUp,
            (Greater, Less) => DirectionClass::RightDown,
            (Greater, Greater) => DirectionClass::RightUp,
            (Equal, Equal) => DirectionClass::Same,
        }
    }
}

impl fmt::Display for DirectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DirectionClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectionClass::ALL
            .into_iter()
            .find(|class| class.label() == s)
            .ok_or_else(|| Error::InvalidDirection(s.to_string()))
    }
}

/// Keypad `(column, row)` of a digit, `None` for anything but `'0'..='9'`
pub fn keypad_position(digit: char) -> Option<(i32, i32)> {
    let d = digit.to_digit(10)? as i32;
    if d == 0 {
        Some((1, 0))
    } else {
        Some(((d - 1) % 3, 3 - (d - 1) / 3))
    }
}

/// Move between two digits as `(dx, dy)` on the keypad
pub fn keypad_delta(from: char, to: char) -> Option<(i32, i32)> {
    let (x0, y0) = keypad_position(from)?;
    let (x1, y1) = keypad_position(to)?;
    Some((x1 - x0, y1 - y0))
}

/// Labeled magnitude of a move: horizontal part then vertical part
///
/// `R1`, `D3`, `L2U1`; a repeated key is `S0`.
pub fn distance_label(dx: i32, dy: i32) -> String {
    if dx == 0 && dy == 0 {
        return "S0".to_string();
    }

    let mut label = String::new();
    if dx != 0 {
        label.push(if dx < 0 { 'L' } else { 'R' });
        label.push_str(&dx.abs().to_string());
    }
    if dy != 0 {
        label.push(if dy < 0 { 'D' } else { 'U' });
        label.push_str(&dy.abs().to_string());
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_positions() {
        assert_eq!(keypad_position('1'), Some((0, 3)));
        assert_eq!(keypad_position('5'), Some((1, 2)));
        assert_eq!(keypad_position('9'), Some((2, 1)));
        assert_eq!(keypad_position('0'), Some((1, 0)));
        assert_eq!(keypad_position('a'), None);
    }

    #[test]
    fn test_cardinal_moves() {
        let class = |a, b| {
            let (dx, dy) = keypad_delta(a, b).unwrap();
            DirectionClass::from_delta(dx, dy)
        };
        assert_eq!(class('1', '2'), DirectionClass::Right);
        assert_eq!(class('3', '1'), DirectionClass::Left);
        assert_eq!(class('2', '0'), DirectionClass::Down);
        assert_eq!(class('0', '8'), DirectionClass::Up);
        assert_eq!(class('1', '0'), DirectionClass::RightDown);
        assert_eq!(class('7', '3'), DirectionClass::RightUp);
        assert_eq!(class('3', '0'), DirectionClass::LeftDown);
        assert_eq!(class('0', '7'), DirectionClass::LeftUp);
        assert_eq!(class('4', '4'), DirectionClass::Same);
    }

    #[test]
    fn test_distance_labels() {
        assert_eq!(distance_label(1, 0), "R1");
        assert_eq!(distance_label(0, -3), "D3");
        assert_eq!(distance_label(1, -2), "R1D2");
        assert_eq!(distance_label(-2, 1), "L2U1");
        assert_eq!(distance_label(0, 0), "S0");
    }

    #[test]
    fn test_label_round_trip() {
        for class in DirectionClass::ALL {
            assert_eq!(class.label().parse::<DirectionClass>().unwrap(), class);
            assert_eq!(class.to_string(), class.label());
        }
        assert!(matches!("X".parse::<DirectionClass>(), Err(Error::InvalidDirection(_))));
    }

    #[test]
    fn test_serde_uses_labels() {
        assert_eq!(serde_json::to_string(&DirectionClass::RightDown).unwrap(), "\"RD\"");
        let parsed: DirectionClass = serde_json::from_str("\"LU\"").unwrap();
        assert_eq!(parsed, DirectionClass::LeftUp);
    }
}
