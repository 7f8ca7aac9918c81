//! Plate-text extraction and correction
//!
//! Takes noisy OCR text and recovers the first grammar-valid 7-character
//! window, repairing per-position class misreads via the fixed substitution
//! tables. Deterministic and pure; no input makes it panic.

use crate::constants::correction::{digit_for_letter, letter_for_digit};
use crate::model::plate::{is_valid_plate, PositionClass, PLATE_LEN, POSITION_CLASSES};

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectedCandidate {
    /// Grammar-valid 7-character plate text
    pub text: String,
    /// Whether any character was substituted to reach validity
    pub was_corrected: bool,
}

/// Extract the leftmost grammar-valid plate from raw OCR text.
///
/// Normalizes the input (whitespace stripped, uppercased), then slides a
/// 7-character window left to right. Each window is tested as-is first,
/// then with position-aware correction applied. The first window that
/// validates either way wins; later windows are never preferred, even when
/// they would need fewer corrections.
pub fn correct(raw_text: &str) -> Option<CorrectedCandidate> {
    let normalized = normalize(raw_text);
    if normalized.len() < PLATE_LEN {
        return None;
    }

    for window in normalized.windows(PLATE_LEN) {
        if is_valid_plate(window) {
            return Some(CorrectedCandidate {
                text: window.iter().collect(),
                was_corrected: false,
            });
        }

        if let Some(repaired) = repair_window(window) {
            return Some(CorrectedCandidate {
                text: repaired,
                was_corrected: true,
            });
        }
    }

    None
}

/// Strip all whitespace and uppercase what remains
fn normalize(raw_text: &str) -> Vec<char> {
    raw_text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Single-pass position-aware repair of one window.
///
/// Positions already matching their expected class are left untouched;
/// mismatched positions are substituted through the opposite-class table.
/// Returns the repaired text only if it validates afterwards.
fn repair_window(window: &[char]) -> Option<String> {
    let mut repaired = [' '; PLATE_LEN];

    for (i, (&c, class)) in window.iter().zip(POSITION_CLASSES.iter()).enumerate() {
        repaired[i] = if class.matches(c) {
            c
        } else {
            match class {
                PositionClass::Letter => letter_for_digit(c)?,
                PositionClass::Digit => digit_for_letter(c)?,
            }
        };
    }

    if is_valid_plate(&repaired) {
        Some(repaired.iter().collect())
    } else {
        None
    }
}
