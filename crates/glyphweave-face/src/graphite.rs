//! Graphite feature declarations: the `Feat` and `Sill` tables
//!
//! `Feat` lists every feature a face understands together with its legal
//! settings; the first setting is the default. `Sill` overrides defaults per
//! language. Labels (name table ids) are skipped; only values matter here.

use std::collections::BTreeMap;

use glyphweave_core::types::Tag;
use read_fonts::{FontData, ReadError};

use crate::catalog::FeatureDef;

const FEAT_HEADER_LEN: usize = 12;
const SILL_HEADER_LEN: usize = 12;
const SILL_ENTRY_LEN: usize = 8;
const SILL_SETTING_LEN: usize = 8;
const SETTING_LEN: usize = 4;

/// Features declared by a `Feat` table, in table order
pub fn parse_feat(data: FontData<'_>) -> Result<Vec<FeatureDef>, ReadError> {
    let version: u32 = data.read_at(0)?;
    let count: u16 = data.read_at(4)?;
    // Version 2 widened feature ids to 32 bits
    let wide = version >> 16 >= 2;
    let record_len = if wide { 16 } else { 12 };

    let mut features = Vec::with_capacity(count as usize);
    for index in 0..count as usize {
        let record = FEAT_HEADER_LEN + index * record_len;
        let (id, num_settings, settings_offset) = if wide {
            (
                data.read_at::<u32>(record)?,
                data.read_at::<u16>(record + 4)?,
                data.read_at::<u32>(record + 8)?,
            )
        } else {
            (
                u32::from(data.read_at::<u16>(record)?),
                data.read_at::<u16>(record + 2)?,
                data.read_at::<u32>(record + 4)?,
            )
        };

        let settings = (0..num_settings as usize)
            .map(|i| {
                data.read_at::<i16>(settings_offset as usize + i * SETTING_LEN)
                    .map(i32::from)
            })
            .collect::<Result<Vec<_>, _>>()?;
        features.push(FeatureDef::from_settings(Tag::from_u32(id), settings));
    }
    Ok(features)
}

/// Per-language overrides from a `Sill` table, keyed by NUL padded code
pub fn parse_sill(data: FontData<'_>) -> Result<BTreeMap<Tag, Vec<(Tag, i32)>>, ReadError> {
    let count: u16 = data.read_at(4)?;

    let mut languages = BTreeMap::new();
    for index in 0..count as usize {
        let entry = SILL_HEADER_LEN + index * SILL_ENTRY_LEN;
        let code = Tag::from_u32(data.read_at::<u32>(entry)?);
        let num_settings: u16 = data.read_at(entry + 4)?;
        let offset = data.read_at::<u16>(entry + 6)? as usize;

        let settings = (0..num_settings as usize)
            .map(|i| {
                let setting = offset + i * SILL_SETTING_LEN;
                Ok((
                    Tag::from_u32(data.read_at::<u32>(setting)?),
                    i32::from(data.read_at::<i16>(setting + 4)?),
                ))
            })
            .collect::<Result<Vec<_>, ReadError>>()?;
        languages.insert(code, settings);
    }
    Ok(languages)
}
