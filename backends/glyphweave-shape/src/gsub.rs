//! Glyph substitution: single and ligature lookups
//!
//! Lookups run in plan order over one run at a time. Within a lookup the
//! subtables are tried in declaration order and the first one that applies
//! wins. Other lookup types are skipped.

use glyphweave_core::types::GlyphId;
use read_fonts::tables::gsub::{Gsub, LigatureSubstFormat1, SingleSubst, SubstitutionSubtables};
use read_fonts::tables::layout::LookupFlag;
use read_fonts::types::GlyphId16;
use read_fonts::ReadError;

use crate::buffer::{next_unskipped, GlyphInfo};
use crate::plan::StagedLookup;

pub(crate) fn glyph16(glyph: GlyphId) -> Option<GlyphId16> {
    u16::try_from(glyph).ok().map(GlyphId16::new)
}

/// Runs every planned lookup over `glyphs`
pub fn apply_lookups(
    gsub: &Gsub<'_>,
    plan: &[StagedLookup],
    glyphs: &mut Vec<GlyphInfo>,
) -> Result<(), ReadError> {
    let lookup_list = gsub.lookup_list()?;
    let lookups = lookup_list.lookups();

    for staged in plan {
        let lookup = lookups.get(usize::from(staged.index))?;
        let ignore_marks = lookup.lookup_flag().contains(LookupFlag::IGNORE_MARKS);

        match lookup.subtables()? {
            SubstitutionSubtables::Single(subtables) => {
                let subtables = subtables.iter().collect::<Result<Vec<_>, _>>()?;
                for glyph in glyphs.iter_mut() {
                    if (ignore_marks && glyph.is_mark) || !staged.applies_to(glyph) {
                        continue;
                    }
                    if let Some(substitute) = single_substitute(&subtables, glyph.glyph)? {
                        glyph.glyph = substitute;
                    }
                }
            }
            SubstitutionSubtables::Ligature(subtables) => {
                let subtables = subtables.iter().collect::<Result<Vec<_>, _>>()?;
                apply_ligatures(&subtables, staged, ignore_marks, glyphs)?;
            }
            _ => log::trace!("Skipping unsupported GSUB lookup {}", staged.index),
        }
    }
    Ok(())
}

fn single_substitute(
    subtables: &[SingleSubst<'_>],
    glyph: GlyphId,
) -> Result<Option<GlyphId>, ReadError> {
    let Some(gid) = glyph16(glyph) else {
        return Ok(None);
    };
    for subtable in subtables {
        match subtable {
            SingleSubst::Format1(table) => {
                if table.coverage()?.get(gid).is_some() {
                    let delta = i32::from(table.delta_glyph_id());
                    let substitute = (i32::from(gid.to_u16()) + delta) & 0xFFFF;
                    return Ok(Some(substitute as GlyphId));
                }
            }
            SingleSubst::Format2(table) => {
                let Some(index) = table.coverage()?.get(gid) else {
                    continue;
                };
                if let Some(substitute) = table.substitute_glyph_ids().get(usize::from(index)) {
                    return Ok(Some(GlyphId::from(substitute.get().to_u16())));
                }
            }
        }
    }
    Ok(None)
}

fn apply_ligatures(
    subtables: &[LigatureSubstFormat1<'_>],
    staged: &StagedLookup,
    ignore_marks: bool,
    glyphs: &mut Vec<GlyphInfo>,
) -> Result<(), ReadError> {
    let mut start = 0;
    while start < glyphs.len() {
        if (ignore_marks && glyphs[start].is_mark) || !staged.applies_to(&glyphs[start]) {
            start += 1;
            continue;
        }
        if let Some((ligature, components)) = match_ligature(subtables, glyphs, start, ignore_marks)? {
            // Skipped marks between the components join the ligature's cluster.
            let cluster = glyphs[start].cluster;
            let last = components.last().copied().unwrap_or(start);
            for glyph in &mut glyphs[start..=last] {
                glyph.cluster = cluster;
            }
            glyphs[start].glyph = ligature;
            glyphs[start].is_mark = false;
            for &index in components.iter().rev() {
                glyphs.remove(index);
            }
        }
        start += 1;
    }
    Ok(())
}

/// The ligature glyph and the indices of the components after `start`
fn match_ligature(
    subtables: &[LigatureSubstFormat1<'_>],
    glyphs: &[GlyphInfo],
    start: usize,
    ignore_marks: bool,
) -> Result<Option<(GlyphId, Vec<usize>)>, ReadError> {
    let Some(first) = glyph16(glyphs[start].glyph) else {
        return Ok(None);
    };
    for subtable in subtables {
        let Some(coverage_index) = subtable.coverage()?.get(first) else {
            continue;
        };
        let set = subtable.ligature_sets().get(usize::from(coverage_index))?;
        'ligatures: for ligature in set.ligatures().iter() {
            let ligature = ligature?;
            let mut components = Vec::new();
            let mut next = start + 1;
            for component in ligature.component_glyph_ids() {
                let Some(index) = next_unskipped(glyphs, next, ignore_marks) else {
                    continue 'ligatures;
                };
                if glyphs[index].glyph != GlyphId::from(component.get().to_u16()) {
                    continue 'ligatures;
                }
                components.push(index);
                next = index + 1;
            }
            return Ok(Some((
                GlyphId::from(ligature.ligature_glyph().to_u16()),
                components,
            )));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphweave_core::types::Tag;
    use glyphweave_test_fonts::{gid, opentype_font};
    use glyphweave_unicode::JoiningForm;
    use read_fonts::{FontRef, TableProvider};

    fn run(glyph_ids: &[u32], plan: &[StagedLookup]) -> Vec<GlyphInfo> {
        let data = opentype_font();
        let font = FontRef::new(&data).unwrap();
        let mut glyphs: Vec<GlyphInfo> = glyph_ids
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut info = GlyphInfo::new(g, i as u32, 0, Tag::new(b"latn"));
                info.is_mark = g == u32::from(gid::ACUTE);
                info
            })
            .collect();
        apply_lookups(&font.gsub().unwrap(), plan, &mut glyphs).unwrap();
        glyphs
    }

    fn everywhere(index: u16) -> StagedLookup {
        StagedLookup { index, forms: None }
    }

    fn ids(glyphs: &[GlyphInfo]) -> Vec<u32> {
        glyphs.iter().map(|g| g.glyph).collect()
    }

    #[test]
    fn f_i_forms_a_ligature() {
        let glyphs = run(&[u32::from(gid::F), u32::from(gid::I)], &[everywhere(0)]);
        assert_eq!(ids(&glyphs), vec![u32::from(gid::F_I)]);
        assert_eq!(glyphs[0].cluster, 0);
    }

    #[test]
    fn ligature_skips_marks_and_keeps_them() {
        let glyphs = run(
            &[u32::from(gid::F), u32::from(gid::ACUTE), u32::from(gid::I)],
            &[everywhere(0)],
        );
        assert_eq!(ids(&glyphs), vec![u32::from(gid::F_I), u32::from(gid::ACUTE)]);
        assert_eq!(glyphs[1].cluster, 0);
    }

    #[test]
    fn incomplete_ligature_is_left_alone() {
        let glyphs = run(&[u32::from(gid::F), u32::from(gid::O)], &[everywhere(0)]);
        assert_eq!(ids(&glyphs), vec![u32::from(gid::F), u32::from(gid::O)]);
    }

    #[test]
    fn single_substitution_by_list() {
        let glyphs = run(&[u32::from(gid::E), u32::from(gid::L)], &[everywhere(2)]);
        assert_eq!(ids(&glyphs), vec![u32::from(gid::E_ALT), u32::from(gid::L)]);
    }

    #[test]
    fn form_lookups_only_touch_their_form() {
        let data = opentype_font();
        let font = FontRef::new(&data).unwrap();
        let arab = Tag::new(b"arab");
        let mut glyphs = vec![
            GlyphInfo::new(u32::from(gid::BEH), 0, 1, arab),
            GlyphInfo::new(u32::from(gid::BEH), 1, 1, arab),
        ];
        glyphs[0].form = Some(JoiningForm::Initial);
        glyphs[1].form = Some(JoiningForm::Final);
        let plan = [
            StagedLookup {
                index: 3,
                forms: Some(vec![JoiningForm::Initial]),
            },
            StagedLookup {
                index: 5,
                forms: Some(vec![JoiningForm::Final]),
            },
        ];
        apply_lookups(&font.gsub().unwrap(), &plan, &mut glyphs).unwrap();
        assert_eq!(
            ids(&glyphs),
            vec![u32::from(gid::BEH_INIT), u32::from(gid::BEH_FINA)]
        );
    }
}
