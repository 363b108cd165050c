//! From analyzed text to slots
//!
//! Glyph mapping, substitution and positioning work run by run in logical
//! order and in design units. Reordering, mark placement and scaling come
//! last, over the whole buffer.

use std::collections::BTreeMap;
use std::ops::Range;

use glyphweave_core::diagnostics::{Diagnostic, DiagnosticSink};
use glyphweave_core::types::{Slot, Tag, NOTDEF};
use glyphweave_core::Result;
use glyphweave_face::{FaceData, GlyphMetrics};
use glyphweave_unicode::{visual_order, Analysis, CharInfo};
use read_fonts::tables::gpos::Gpos;
use read_fonts::tables::gsub::Gsub;
use read_fonts::tables::layout::{FeatureList, ScriptList};
use read_fonts::{FontRef, ReadError, TableProvider};

use crate::buffer::GlyphInfo;
use crate::gpos;
use crate::gsub;
use crate::plan::{plan_lookups, FeatureValues, StagedLookup};

const GSUB: Tag = Tag::new(b"GSUB");
const GPOS: Tag = Tag::new(b"GPOS");

/// How design units become pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub scale: f32,
    pub round_advances: bool,
}

/// Shapes analyzed text into slots in visual order
pub fn shape_analysis(
    data: &FaceData,
    analysis: &Analysis,
    values: &FeatureValues,
    scaling: Scaling,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Slot>> {
    let font = data.font_ref()?;
    let metrics = data.glyph_metrics()?;
    let mut glyphs: Vec<GlyphInfo> = analysis
        .chars
        .iter()
        .map(|info| map_char(&metrics, info, sink))
        .collect();

    let (gsub_table, gpos_table) = layout_tables(data, &font, sink);
    let mut gsub_plans = PlanCache::default();
    let mut gpos_plans = PlanCache::default();

    // Substitution may change the glyph count, so run bounds are rebuilt.
    let mut substituted = Vec::with_capacity(glyphs.len());
    let mut runs: Vec<Range<usize>> = Vec::with_capacity(analysis.runs.len());
    for run in &analysis.runs {
        let mut run_glyphs = glyphs[run.range.clone()].to_vec();
        if let Some(table) = &gsub_table {
            let plan = gsub_plans.get(GSUB, run.script, values, sink, || {
                (table.script_list(), table.feature_list())
            });
            let original = run_glyphs.clone();
            if let Err(err) = gsub::apply_lookups(table, &plan, &mut run_glyphs) {
                report_malformed(sink, GSUB, &err);
                run_glyphs = original;
            }
        }
        let start = substituted.len();
        substituted.extend(run_glyphs);
        runs.push(start..substituted.len());
    }
    glyphs = substituted;

    for glyph in &mut glyphs {
        glyph.advance = i32::from(metrics.advance_width(glyph.glyph).unwrap_or(0));
    }

    if let Some(table) = &gpos_table {
        for (run, range) in analysis.runs.iter().zip(&runs) {
            let plan = gpos_plans.get(GPOS, run.script, values, sink, || {
                (table.script_list(), table.feature_list())
            });
            let original = glyphs[range.clone()].to_vec();
            if let Err(err) =
                gpos::apply_lookups(table, &plan, &mut glyphs[range.clone()], range.start)
            {
                report_malformed(sink, GPOS, &err);
                glyphs[range.clone()].copy_from_slice(&original);
            }
        }
    }

    Ok(place(&glyphs, scaling))
}

/// Character to glyph, mirrored in right-to-left runs
fn map_char(
    metrics: &GlyphMetrics<'_>,
    info: &CharInfo,
    sink: &dyn DiagnosticSink,
) -> GlyphInfo {
    let mirror = info.mirror.and_then(|ch| metrics.glyph_for_char(ch));
    let glyph = mirror.or_else(|| metrics.glyph_for_char(info.ch));

    let glyph = glyph.unwrap_or_else(|| {
        sink.report(&Diagnostic::MissingGlyph {
            ch: info.ch,
            cluster: info.cluster,
        });
        NOTDEF
    });

    let mut mapped = GlyphInfo::new(glyph, info.cluster, info.level, info.script);
    mapped.form = info.form;
    mapped.is_mark = info.is_mark;
    mapped
}

fn layout_tables<'a>(
    data: &FaceData,
    font: &FontRef<'a>,
    sink: &dyn DiagnosticSink,
) -> (Option<Gsub<'a>>, Option<Gpos<'a>>) {
    if !data.has_layout() {
        return (None, None);
    }
    let gsub = font
        .table_data(read_fonts::types::Tag::new(b"GSUB"))
        .and_then(|_| match font.gsub() {
            Ok(table) => Some(table),
            Err(err) => {
                report_malformed(sink, GSUB, &err);
                None
            }
        });
    let gpos = font
        .table_data(read_fonts::types::Tag::new(b"GPOS"))
        .and_then(|_| match font.gpos() {
            Ok(table) => Some(table),
            Err(err) => {
                report_malformed(sink, GPOS, &err);
                None
            }
        });
    (gsub, gpos)
}

fn report_malformed(sink: &dyn DiagnosticSink, tag: Tag, err: &ReadError) {
    sink.report(&Diagnostic::MalformedTable {
        tag,
        reason: err.to_string(),
    });
}

/// Lookup plans of one table, computed once per script
///
/// A script whose plan cannot be read gets an empty plan, reported once.
#[derive(Default)]
struct PlanCache {
    plans: BTreeMap<Tag, Vec<StagedLookup>>,
}

impl PlanCache {
    fn get<'a>(
        &mut self,
        table: Tag,
        script: Tag,
        values: &FeatureValues,
        sink: &dyn DiagnosticSink,
        lists: impl FnOnce() -> (
            std::result::Result<ScriptList<'a>, ReadError>,
            std::result::Result<FeatureList<'a>, ReadError>,
        ),
    ) -> Vec<StagedLookup> {
        self.plans
            .entry(script)
            .or_insert_with(|| {
                let (scripts, features) = lists();
                scripts
                    .and_then(|scripts| plan_lookups(&scripts, &features?, script, values))
                    .unwrap_or_else(|err| {
                        log::debug!("No {table} plan for script '{script}'");
                        report_malformed(sink, table, &err);
                        Vec::new()
                    })
            })
            .clone()
    }
}

/// Visual order, pen positions, mark placement and scaling
fn place(glyphs: &[GlyphInfo], scaling: Scaling) -> Vec<Slot> {
    let levels: Vec<u8> = glyphs.iter().map(|glyph| glyph.level).collect();
    let order = visual_order(&levels);

    let mut pen_x = vec![0i32; glyphs.len()];
    let mut pen = 0i32;
    for &index in &order {
        pen_x[index] = pen;
        pen += pen_advance(&glyphs[index]);
    }

    let scale = scaling.scale;
    order
        .iter()
        .map(|&index| {
            let glyph = &glyphs[index];
            let (mut x_offset, mut y_offset) = (glyph.x_offset, glyph.y_offset);
            if let Some(attachment) = glyph.attachment {
                let base = &glyphs[attachment.base];
                x_offset += pen_x[attachment.base] + base.x_offset + attachment.dx - pen_x[index];
                y_offset += base.y_offset + attachment.dy;
            }

            let mut advance = pen_advance(glyph) as f32 * scale;
            if scaling.round_advances {
                advance = advance.round();
            }
            Slot {
                id: glyph.glyph,
                advance,
                x_offset: x_offset as f32 * scale,
                y_offset: y_offset as f32 * scale,
                cluster: glyph.cluster,
                level: glyph.level,
            }
        })
        .collect()
}

/// Attached marks sit on their base and move the pen by nothing
fn pen_advance(glyph: &GlyphInfo) -> i32 {
    if glyph.attachment.is_some() {
        0
    } else {
        glyph.advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Attachment;

    fn glyph(id: u32, advance: i32, level: u8) -> GlyphInfo {
        let mut info = GlyphInfo::new(id, id, level, Tag::new(b"latn"));
        info.advance = advance;
        info
    }

    #[test]
    fn marks_land_on_their_base_in_both_directions() {
        let scaling = Scaling {
            scale: 1.0,
            round_advances: false,
        };
        for level in [0, 1] {
            let mut glyphs = vec![glyph(3, 500, level), glyph(13, 0, level)];
            glyphs[1].attachment = Some(Attachment {
                base: 0,
                dx: 250,
                dy: 600,
            });
            let slots = place(&glyphs, scaling);
            let mark = slots.iter().find(|slot| slot.id == 13).unwrap();
            // Left to right the pen has already passed the base.
            let expected = if level == 0 { -250.0 } else { 250.0 };
            assert_eq!(mark.x_offset, expected);
            assert_eq!(mark.y_offset, 600.0);
        }
    }

    #[test]
    fn attached_marks_take_no_advance() {
        let scaling = Scaling {
            scale: 1.0,
            round_advances: false,
        };
        let mut glyphs = vec![glyph(3, 500, 0), glyph(13, 300, 0), glyph(4, 550, 0)];
        glyphs[1].attachment = Some(Attachment {
            base: 0,
            dx: 250,
            dy: 600,
        });
        let slots = place(&glyphs, scaling);
        assert_eq!(slots[1].advance, 0.0);
        assert_eq!(slots[1].x_offset, -250.0);
        let total: f32 = slots.iter().map(|slot| slot.advance).sum();
        assert_eq!(total, 1050.0);

        // Unattached, the same mark keeps its width
        glyphs[1].attachment = None;
        assert_eq!(place(&glyphs, scaling)[1].advance, 300.0);
    }

    #[test]
    fn right_to_left_glyphs_are_reversed() {
        let glyphs = vec![glyph(1, 100, 1), glyph(2, 200, 1), glyph(3, 300, 1)];
        let slots = place(
            &glyphs,
            Scaling {
                scale: 0.5,
                round_advances: false,
            },
        );
        let ids: Vec<u32> = slots.iter().map(|slot| slot.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(slots[0].advance, 150.0);
    }

    #[test]
    fn rounding_applies_to_advances() {
        let slots = place(
            &[glyph(1, 333, 0)],
            Scaling {
                scale: 0.02,
                round_advances: true,
            },
        );
        assert_eq!(slots[0].advance, 7.0);
    }
}
