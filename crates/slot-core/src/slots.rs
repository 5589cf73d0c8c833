//! Body slot decoding for first-person coverage flags
//!
//! Each set bit of the 32-bit flag field is one body slot. Slot numbers
//! start at 30 for bit 0, so bit 31 is slot 61.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot number of bit 0
pub const FIRST_SLOT: u32 = 30;

/// Decoded body slots, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotList(Vec<u32>);

impl SlotList {
    /// The slot numbers
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for SlotList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// Decode a coverage mask into slot numbers
///
/// An absent or zero mask decodes to an empty list.
pub fn decode_slots(mask: Option<u32>) -> SlotList {
    let mask = match mask {
        Some(m) if m != 0 => m,
        _ => return SlotList::default(),
    };

    SlotList(
        (0..u32::BITS)
            .filter(|bit| mask & (1u32 << bit) != 0)
            .map(|bit| FIRST_SLOT + bit)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_absent_and_zero() {
        assert!(decode_slots(None).is_empty());
        assert!(decode_slots(Some(0)).is_empty());
        assert_eq!(decode_slots(Some(0)).to_string(), "");
    }

    #[test]
    fn test_decode_examples() {
        assert_eq!(decode_slots(Some(0b101)).as_slice(), &[30, 32]);
        assert_eq!(decode_slots(Some(0x8000_0000)).as_slice(), &[61]);
        assert_eq!(decode_slots(Some(0b1)).as_slice(), &[30]);
        assert_eq!(decode_slots(Some(0b10)).as_slice(), &[31]);
    }

    #[test]
    fn test_decode_all_bits() {
        let slots = decode_slots(Some(u32::MAX));
        assert_eq!(slots.len(), 32);
        assert_eq!(slots.as_slice().first(), Some(&30));
        assert_eq!(slots.as_slice().last(), Some(&61));
    }

    #[test]
    fn test_decode_is_ascending_and_in_range() {
        let masks = [1u32, 0x5555_5555, 0xAAAA_AAAA, 0x0F0F_F0F0, 0x8000_0001, 0xDEAD_BEEF];
        for mask in masks {
            let slots = decode_slots(Some(mask));
            assert_eq!(slots.len() as u32, mask.count_ones());
            assert!(slots.as_slice().windows(2).all(|w| w[0] < w[1]));
            assert!(slots.as_slice().iter().all(|s| (30..=61).contains(s)));
        }
    }

    #[test]
    fn test_display_comma_joined() {
        assert_eq!(decode_slots(Some(0b1011)).to_string(), "30,31,33");
        assert_eq!(decode_slots(Some(0x8000_0000)).to_string(), "61");
    }
}
