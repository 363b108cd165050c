// this_file: crates/glyphweave-face/tests/lib.rs

use glyphweave_core::lifecycle::scoped;
use glyphweave_core::types::Tag;
use glyphweave_core::Release;
use glyphweave_face::{Face, FaceOptions, FeatureSettings};
use glyphweave_test_fonts::{test_font, write_temp_font};
use read_fonts::{FontRef as ReadFontRef, TableProvider};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_face_when_loading_from_disk_then_matches_read_fonts_tables() {
    init_logging();
    let path = write_temp_font("face-from-disk.ttf", &test_font()).expect("write test font");
    let face = Face::load(&path, FaceOptions::Default).expect("load test font");

    let data = std::fs::read(&path).expect("read test font bytes");
    let read_font = ReadFontRef::from_index(&data, 0).expect("parse test font");
    let expected_upem = read_font.head().map(|head| head.units_per_em()).unwrap_or(1000);
    let expected_glyphs = read_font.maxp().map(|maxp| maxp.num_glyphs()).unwrap_or(0);

    assert_eq!(face.units_per_em().unwrap(), expected_upem);
    assert_eq!(face.glyph_count().unwrap(), u32::from(expected_glyphs));
    assert_eq!(face.source(), path.display().to_string());
}

#[test]
fn test_table_lookup_when_face_released_then_fails_fast() {
    init_logging();
    let path = write_temp_font("face-release.ttf", &test_font()).expect("write test font");
    let mut face = Face::load(&path, FaceOptions::Default).expect("load test font");

    let gsub = face.table_lookup(Tag::new(b"GSUB")).unwrap();
    assert!(gsub.is_some());

    face.release();
    let err = face.table_lookup(Tag::new(b"GSUB")).unwrap_err();
    assert!(err.is_released());
    assert_eq!(err.to_string(), "Resource error: face used after release");
}

#[test]
fn test_scoped_face_and_settings_release_at_end_of_scope() {
    init_logging();
    let weak = {
        let face = scoped(Face::from_data(test_font(), FaceOptions::Default).unwrap());
        let settings = scoped(FeatureSettings::for_language(&face, "en").unwrap());
        assert_eq!(settings.get(Tag::new(b"liga")).unwrap(), Some(1));
        face.downgrade()
    };
    assert!(!weak.is_live());
}

#[test]
fn test_faces_are_shareable_across_threads() {
    init_logging();
    let face = Face::from_data(test_font(), FaceOptions::Default).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let settings = FeatureSettings::for_language(&face, "tr").unwrap();
                assert_eq!(settings.get(Tag::new(b"liga")).unwrap(), Some(0));
            });
        }
    });
}
