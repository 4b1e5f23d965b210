//! Filename sanitising for player-chosen save slots.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in slot filenames. Everything else is
/// percent-encoded, including `.` so `..` can never escape the save directory.
const SLOT_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Turn a slot name into a filename that stays inside the save directory.
/// A trailing `.json` is kept readable.
pub fn safe_filename(slot: &str) -> String {
    let slot = slot.trim();
    match slot.strip_suffix(".json").filter(|stem| !stem.is_empty()) {
        Some(stem) => format!("{}.json", utf8_percent_encode(stem, SLOT_SET)),
        None => utf8_percent_encode(slot, SLOT_SET).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(safe_filename("slot2.json"), "slot2.json");
        assert_eq!(safe_filename("my_save-1"), "my_save-1");
    }

    #[test]
    fn path_tricks_are_encoded() {
        assert_eq!(safe_filename("../escape"), "%2E%2E%2Fescape");
        assert_eq!(safe_filename("a/b.json"), "a%2Fb.json");
        assert!(!safe_filename("..\\x").contains('\\'));
    }
}
