//! Unicode scripts and their OpenType tags

use glyphweave_core::types::Tag;
use icu_properties::props::Script;

/// The default script tag used when a face has no entry for a script
pub const DEFAULT_SCRIPT: Tag = Tag::new(b"DFLT");

/// Common, Inherited and Unknown characters take the script around them
pub fn is_significant_script(script: Script) -> bool {
    !matches!(script, Script::Common | Script::Inherited | Script::Unknown)
}

/// OpenType script tag for a Unicode script
pub fn ot_script_tag(script: Script) -> Tag {
    let tag = match script {
        Script::Arabic => b"arab",
        Script::Armenian => b"armn",
        Script::Bengali => b"beng",
        Script::Cyrillic => b"cyrl",
        Script::Devanagari => b"deva",
        Script::Georgian => b"geor",
        Script::Greek => b"grek",
        Script::Gujarati => b"gujr",
        Script::Gurmukhi => b"guru",
        Script::Hangul => b"hang",
        Script::Han => b"hani",
        Script::Hebrew => b"hebr",
        Script::Hiragana | Script::Katakana => b"kana",
        Script::Kannada => b"knda",
        Script::Khmer => b"khmr",
        Script::Lao => b"lao ",
        Script::Latin => b"latn",
        Script::Malayalam => b"mlym",
        Script::Myanmar => b"mymr",
        Script::Oriya => b"orya",
        Script::Sinhala => b"sinh",
        Script::Syriac => b"syrc",
        Script::Tamil => b"taml",
        Script::Telugu => b"telu",
        Script::Thaana => b"thaa",
        Script::Thai => b"thai",
        Script::Tibetan => b"tibt",
        _ => return DEFAULT_SCRIPT,
    };
    Tag::new(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_scripts_map_to_their_tags() {
        assert_eq!(ot_script_tag(Script::Latin), Tag::new(b"latn"));
        assert_eq!(ot_script_tag(Script::Arabic), Tag::new(b"arab"));
        assert_eq!(ot_script_tag(Script::Katakana), Tag::new(b"kana"));
    }

    #[test]
    fn neutral_scripts_fall_back_to_default() {
        assert_eq!(ot_script_tag(Script::Common), DEFAULT_SCRIPT);
        assert!(!is_significant_script(Script::Inherited));
        assert!(is_significant_script(Script::Hebrew));
    }
}
