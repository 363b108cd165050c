// this_file: crates/glyphweave/tests/end_to_end.rs

use anyhow::{ensure, Context, Result};
use glyphweave::lifecycle::scoped;
use glyphweave::prelude::*;
use glyphweave_test_fonts::{test_font, write_temp_font};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_face_on_disk(name: &str) -> Result<Face> {
    let path = write_temp_font(name, &test_font()).context("writing test font")?;
    Ok(glyphweave::load_face(&path, FaceOptions::Default)?)
}

#[test]
fn load_create_release() -> Result<()> {
    init_logging();
    let mut face = test_face_on_disk("load_create_release.ttf")?;
    let mut font = glyphweave::create_font(&face, 20.0)?;
    ensure!(font.scale_x()? > 0.0);
    ensure!(font.scale_y()? > 0.0);

    glyphweave::release(&mut font);
    glyphweave::release(&mut face);
    ensure!(font.is_released() && face.is_released());
    Ok(())
}

#[test]
fn hello_world_left_to_right() -> Result<()> {
    init_logging();
    let face = test_face_on_disk("hello_world.ttf")?;
    let features = glyphweave::features_for_language(&face, "en")?;
    let font = glyphweave::create_font(&face, 20.0)?;

    let text = "hello world";
    let segment = glyphweave::shape(&font, Tag::NONE, &features, text, Direction::LeftToRight)?;
    let slots = segment.slots()?;
    ensure!(!slots.is_empty());
    ensure!(slots.len() <= text.chars().count());
    ensure!(slots[0].cluster == 0, "first cluster is {}", slots[0].cluster);
    Ok(())
}

#[test]
fn empty_text_with_auto_direction() -> Result<()> {
    let face = Face::from_data(test_font(), FaceOptions::Default)?;
    let features = glyphweave::features_for_language(&face, "en")?;
    let font = glyphweave::create_font(&face, 12.0)?;

    let segment = glyphweave::shape(&font, Tag::NONE, &features, "", Direction::Auto)?;
    ensure!(segment.is_empty()?);
    ensure!(segment.total_advance()? == 0.0);
    Ok(())
}

#[test]
fn table_lookup_fails_after_release() -> Result<()> {
    let mut face = Face::from_data(test_font(), FaceOptions::Default)?;
    let cmap = Tag::new(b"cmap");
    ensure!(face.table_lookup(cmap)?.is_some());

    glyphweave::release(&mut face);
    let err = face.table_lookup(cmap).unwrap_err();
    ensure!(err.is_released());
    Ok(())
}

#[test]
fn scoped_face_is_released_on_exit() -> Result<()> {
    let font = {
        let face = scoped(Face::from_data(test_font(), FaceOptions::Default)?);
        glyphweave::create_font(&face, 16.0)?
    };
    ensure!(!font.is_face_live());

    let features = Face::from_data(test_font(), FaceOptions::Default)
        .and_then(|face| glyphweave::features_for_language(&face, "en"))?;
    let err = glyphweave::shape(&font, Tag::NONE, &features, "hi", Direction::Auto).unwrap_err();
    ensure!(err.is_released());
    Ok(())
}

#[test]
fn missing_font_file_is_reported() {
    let err = glyphweave::load_face("/nonexistent/glyphweave.ttf", FaceOptions::Default)
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn non_positive_sizes_are_rejected() -> Result<()> {
    let face = Face::from_data(test_font(), FaceOptions::Default)?;
    for size in [0.0, -4.0, f32::NAN] {
        let err = glyphweave::create_font(&face, size).unwrap_err();
        ensure!(matches!(err, GlyphweaveError::InvalidArgument(_)), "{size}: {err}");
    }
    Ok(())
}
