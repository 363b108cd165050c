// this_file: crates/glyphweave-test-fonts/src/graphite.rs

//! Graphite `Feat` and `Sill` tables
//!
//! `write-fonts` has no model for the Graphite tables, so these two are
//! serialized field by field.

/// Graphite feature table, version 2.0
///
/// The first setting of each feature is its default.
pub fn feat(features: &[([u8; 4], Vec<i16>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(0x0002_0000u32.to_be_bytes());
    out.extend((features.len() as u16).to_be_bytes());
    out.extend([0u8; 6]);

    let mut settings_offset = 12 + 16 * features.len();
    for (i, (id, settings)) in features.iter().enumerate() {
        out.extend(id);
        out.extend((settings.len() as u16).to_be_bytes());
        out.extend([0u8; 2]);
        out.extend((settings_offset as u32).to_be_bytes());
        out.extend(0x8000u16.to_be_bytes()); // flags
        out.extend((256 + i as u16).to_be_bytes()); // label
        settings_offset += 4 * settings.len();
    }
    for (i, (_, settings)) in features.iter().enumerate() {
        for (j, &value) in settings.iter().enumerate() {
            out.extend(value.to_be_bytes());
            out.extend((512 + (i * 16 + j) as u16).to_be_bytes());
        }
    }
    out
}

/// Graphite language table: per-language feature overrides
///
/// Language codes are up to four ASCII letters, padded with NUL.
pub fn sill(languages: &[(&str, Vec<([u8; 4], i16)>)]) -> Vec<u8> {
    let count = languages.len() as u16;
    let entry_selector = if count == 0 {
        0
    } else {
        15 - count.leading_zeros() as u16
    };
    let search_range = if count == 0 { 0 } else { 1u16 << entry_selector };

    let mut out = Vec::new();
    out.extend(0x0001_0000u32.to_be_bytes());
    for field in [count, search_range, entry_selector, count - search_range] {
        out.extend(field.to_be_bytes());
    }

    let mut settings_offset = 12 + 8 * (languages.len() + 1);
    for (code, settings) in languages {
        let mut lang = [0u8; 4];
        for (slot, byte) in lang.iter_mut().zip(code.bytes()) {
            *slot = byte;
        }
        out.extend(lang);
        out.extend((settings.len() as u16).to_be_bytes());
        out.extend((settings_offset as u16).to_be_bytes());
        settings_offset += 8 * settings.len();
    }
    // terminating entry
    out.extend([0x80; 4]);
    out.extend(0u16.to_be_bytes());
    out.extend((settings_offset as u16).to_be_bytes());

    for (_, settings) in languages {
        for (id, value) in settings {
            out.extend(id);
            out.extend(value.to_be_bytes());
            out.extend([0u8; 2]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feat_header_then_one_record_per_feature() {
        let table = feat(&[(*b"liga", vec![1, 0]), (*b"kshd", vec![0, 1, 2, 3])]);
        assert_eq!(&table[..4], &[0, 2, 0, 0]);
        assert_eq!(&table[12..16], b"liga");
        // header 12 + two records of 16 + six settings of 4
        assert_eq!(table.len(), 12 + 32 + 24);
    }

    #[test]
    fn sill_ends_with_the_terminator_entry() {
        let table = sill(&[("de", vec![(*b"kshd", 5)])]);
        assert_eq!(&table[12..16], b"de\0\0");
        assert_eq!(&table[20..24], &[0x80; 4]);
        assert_eq!(table.len(), 12 + 16 + 8);
    }
}
