//! Glyph positioning: pair adjustment and mark-to-base attachment

use read_fonts::tables::gpos::{
    AnchorTable, Gpos, MarkBasePosFormat1, PairPos, PositionSubtables, ValueRecord,
};
use read_fonts::tables::layout::LookupFlag;
use read_fonts::ReadError;

use crate::buffer::{next_unskipped, Attachment, GlyphInfo};
use crate::gsub::glyph16;
use crate::plan::StagedLookup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Adjustment {
    x_placement: i32,
    y_placement: i32,
    x_advance: i32,
}

impl Adjustment {
    fn from_record(record: &ValueRecord) -> Self {
        Self {
            x_placement: i32::from(record.x_placement().unwrap_or(0)),
            y_placement: i32::from(record.y_placement().unwrap_or(0)),
            x_advance: i32::from(record.x_advance().unwrap_or(0)),
        }
    }

    fn apply(self, glyph: &mut GlyphInfo) {
        glyph.advance += self.x_advance;
        glyph.x_offset += self.x_placement;
        glyph.y_offset += self.y_placement;
    }
}

/// Runs every planned lookup over one run
///
/// `run_start` is the index of `glyphs[0]` in the whole buffer; mark
/// attachments record their base in buffer indices.
pub fn apply_lookups(
    gpos: &Gpos<'_>,
    plan: &[StagedLookup],
    glyphs: &mut [GlyphInfo],
    run_start: usize,
) -> Result<(), ReadError> {
    let lookup_list = gpos.lookup_list()?;
    let lookups = lookup_list.lookups();

    for staged in plan {
        let lookup = lookups.get(usize::from(staged.index))?;
        let ignore_marks = lookup.lookup_flag().contains(LookupFlag::IGNORE_MARKS);

        match lookup.subtables()? {
            PositionSubtables::Pair(subtables) => {
                let subtables = subtables.iter().collect::<Result<Vec<_>, _>>()?;
                apply_pairs(&subtables, staged, ignore_marks, glyphs)?;
            }
            PositionSubtables::MarkToBase(subtables) => {
                let subtables = subtables.iter().collect::<Result<Vec<_>, _>>()?;
                attach_marks(&subtables, staged, glyphs, run_start)?;
            }
            _ => log::trace!("Skipping unsupported GPOS lookup {}", staged.index),
        }
    }
    Ok(())
}

fn apply_pairs(
    subtables: &[PairPos<'_>],
    staged: &StagedLookup,
    ignore_marks: bool,
    glyphs: &mut [GlyphInfo],
) -> Result<(), ReadError> {
    let mut from = 0;
    while let Some(first) = next_unskipped(glyphs, from, ignore_marks) {
        let Some(second) = next_unskipped(glyphs, first + 1, ignore_marks) else {
            break;
        };
        if staged.applies_to(&glyphs[first]) {
            if let Some((one, two)) = pair_adjustment(subtables, &glyphs[first], &glyphs[second])? {
                one.apply(&mut glyphs[first]);
                two.apply(&mut glyphs[second]);
            }
        }
        from = second;
    }
    Ok(())
}

fn pair_adjustment(
    subtables: &[PairPos<'_>],
    first: &GlyphInfo,
    second: &GlyphInfo,
) -> Result<Option<(Adjustment, Adjustment)>, ReadError> {
    let (Some(first), Some(second)) = (glyph16(first.glyph), glyph16(second.glyph)) else {
        return Ok(None);
    };
    for subtable in subtables {
        match subtable {
            PairPos::Format1(table) => {
                let Some(index) = table.coverage()?.get(first) else {
                    continue;
                };
                let set = table.pair_sets().get(usize::from(index))?;
                for record in set.pair_value_records().iter() {
                    let record = record?;
                    if record.second_glyph() == second {
                        return Ok(Some((
                            Adjustment::from_record(record.value_record1()),
                            Adjustment::from_record(record.value_record2()),
                        )));
                    }
                }
            }
            PairPos::Format2(table) => {
                if table.coverage()?.get(first).is_none() {
                    continue;
                }
                let class1 = table.class_def1()?.get(first);
                let class2 = table.class_def2()?.get(second);
                let class1_record = table.class1_records().get(usize::from(class1))?;
                let record = class1_record.class2_records().get(usize::from(class2))?;
                return Ok(Some((
                    Adjustment::from_record(record.value_record1()),
                    Adjustment::from_record(record.value_record2()),
                )));
            }
        }
    }
    Ok(None)
}

fn attach_marks(
    subtables: &[MarkBasePosFormat1<'_>],
    staged: &StagedLookup,
    glyphs: &mut [GlyphInfo],
    run_start: usize,
) -> Result<(), ReadError> {
    for mark in 0..glyphs.len() {
        if !glyphs[mark].is_mark || !staged.applies_to(&glyphs[mark]) {
            continue;
        }
        let Some(base) = (0..mark).rev().find(|&i| !glyphs[i].is_mark) else {
            continue;
        };
        if let Some((dx, dy)) = mark_offset(subtables, &glyphs[base], &glyphs[mark])? {
            glyphs[mark].attachment = Some(Attachment {
                base: run_start + base,
                dx,
                dy,
            });
        }
    }
    Ok(())
}

/// Base anchor minus mark anchor, from the first subtable covering both
fn mark_offset(
    subtables: &[MarkBasePosFormat1<'_>],
    base: &GlyphInfo,
    mark: &GlyphInfo,
) -> Result<Option<(i32, i32)>, ReadError> {
    let (Some(base), Some(mark)) = (glyph16(base.glyph), glyph16(mark.glyph)) else {
        return Ok(None);
    };
    for subtable in subtables {
        let Some(mark_index) = subtable.mark_coverage()?.get(mark) else {
            continue;
        };
        let Some(base_index) = subtable.base_coverage()?.get(base) else {
            continue;
        };

        let mark_array = subtable.mark_array()?;
        let Some(mark_record) = mark_array.mark_records().get(usize::from(mark_index)) else {
            continue;
        };
        let mark_anchor = anchor_coords(&mark_record.mark_anchor(mark_array.offset_data())?);

        let base_array = subtable.base_array()?;
        let base_record = base_array.base_records().get(usize::from(base_index))?;
        let Some(base_anchor) = base_record
            .base_anchors(base_array.offset_data())
            .get(usize::from(mark_record.mark_class()))
        else {
            continue;
        };
        let base_anchor = anchor_coords(&base_anchor?);

        return Ok(Some((
            base_anchor.0 - mark_anchor.0,
            base_anchor.1 - mark_anchor.1,
        )));
    }
    Ok(None)
}

fn anchor_coords(anchor: &AnchorTable<'_>) -> (i32, i32) {
    match anchor {
        AnchorTable::Format1(at) => (i32::from(at.x_coordinate()), i32::from(at.y_coordinate())),
        AnchorTable::Format2(at) => (i32::from(at.x_coordinate()), i32::from(at.y_coordinate())),
        AnchorTable::Format3(at) => (i32::from(at.x_coordinate()), i32::from(at.y_coordinate())),
    }
}
