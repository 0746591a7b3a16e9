use crate::error::KeymapError;
use crate::keycode::{KeyCode, Modifier};
use crate::keymap::{Keymap, MAX_LAYERS};
use crate::types::{Action, Binding, KeyPos, LayerId};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads a keymap file.
pub fn load_keymap<P: AsRef<Path>>(path: P) -> Result<Keymap> {
    let path = path.as_ref();
    let raw = std::fs::read(path).with_context(|| format!("reading keymap {}", path.display()))?;
    let text = decode_keymap_bytes(&raw);
    let keymap = parse_keymap_content(text.as_ref())
        .with_context(|| format!("parsing keymap {}", path.display()))?;
    info!(
        "Keymap loaded from {} with {} layers.",
        path.display(),
        keymap.layer_count()
    );
    Ok(keymap)
}

fn decode_keymap_bytes(raw: &[u8]) -> Cow<'_, str> {
    if let Some((enc, bom_len)) = encoding_rs::Encoding::for_bom(raw) {
        debug!("Decoded using BOM: {}", enc.name());
        let (cow, _, had_errors) = enc.decode(&raw[bom_len..]);
        if had_errors {
            warn!("Decode had errors (replacement characters used)");
        }
        return cow;
    }

    let (cow, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(raw);
    if had_errors {
        warn!("Keymap is not valid UTF-8 (replacement characters used)");
    }
    cow
}

/// Parses the sectioned keymap format:
///
/// ```text
/// ; name of the keymap
/// [layer 0]
/// KC_ESC, KC_Q, CTL_T(KC_P)
/// MO(1),  KC_A, LT(1, KC_SPC)
///
/// [layer 1]
/// _______, KC_1, CTL_T(KC_Q)
/// ```
///
/// Each line inside a section is one matrix row; cells are column-ordered.
pub fn parse_keymap_content(content: &str) -> Result<Keymap, KeymapError> {
    let mut keymap = Keymap::new();
    let mut current_layer: Option<LayerId> = None;
    let mut row: usize = 0;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if keymap.name.is_none() && current_layer.is_none() && line.starts_with(';') {
            let name = line.trim_start_matches(';').trim();
            if !name.is_empty() {
                keymap.name = Some(name.to_string());
            }
            continue;
        }

        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let layer = parse_section_header(&line[1..line.len() - 1], line_no)?;
            // Make sure empty layers still exist so layer counts are stable.
            if keymap.layers.len() <= layer as usize {
                keymap.layers.resize_with(layer as usize + 1, Default::default);
            }
            current_layer = Some(layer);
            row = 0;
            continue;
        }

        let layer = current_layer.ok_or(KeymapError::RowOutsideSection { line: line_no })?;
        let row_idx = u8::try_from(row).map_err(|_| KeymapError::MatrixTooLarge { line: line_no })?;

        for (col, cell) in split_cells(line).into_iter().enumerate() {
            let col_idx =
                u8::try_from(col).map_err(|_| KeymapError::MatrixTooLarge { line: line_no })?;
            let binding = parse_cell(cell, line_no)?;
            if binding != Binding::Transparent {
                keymap.set(layer, KeyPos::new(row_idx, col_idx), binding);
            }
        }
        row += 1;
    }

    Ok(keymap)
}

fn parse_section_header(inner: &str, line: usize) -> Result<LayerId, KeymapError> {
    let inner = inner.trim();
    let num = inner
        .strip_prefix("layer")
        .or_else(|| inner.strip_prefix("LAYER"))
        .unwrap_or(inner)
        .trim();
    parse_layer(num, line)
}

fn parse_layer(raw: &str, line: usize) -> Result<LayerId, KeymapError> {
    match raw.trim().parse::<LayerId>() {
        Ok(layer) if (layer as usize) < MAX_LAYERS => Ok(layer),
        _ => Err(KeymapError::InvalidLayer {
            line,
            token: raw.trim().to_string(),
        }),
    }
}

/// Splits on commas that are not inside parentheses.
fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                cells.push(line[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = line[start..].trim();
    if !last.is_empty() || !cells.is_empty() {
        cells.push(last);
    }
    cells
}

fn parse_cell(raw: &str, line: usize) -> Result<Binding, KeymapError> {
    match raw {
        "" | "_______" | "KC_TRNS" | "KC_TRANSPARENT" => return Ok(Binding::Transparent),
        "XXXXXXX" | "KC_NO" => return Ok(Binding::None),
        _ => {}
    }

    if let Some((func, args)) = split_call(raw) {
        let malformed = || KeymapError::MalformedCell {
            line,
            token: raw.to_string(),
        };
        return match func {
            "MO" => Ok(Binding::Press(Action::Layer(parse_layer(args, line)?))),
            "LT" => {
                let (layer, key) = args.split_once(',').ok_or_else(malformed)?;
                Ok(Binding::TapHold {
                    tap: parse_action(key.trim(), line)?,
                    hold: Action::Layer(parse_layer(layer, line)?),
                })
            }
            _ => {
                let prefix = func.strip_suffix("_T").ok_or_else(malformed)?;
                let modifier = Modifier::from_mod_tap_prefix(prefix).ok_or_else(malformed)?;
                Ok(Binding::TapHold {
                    tap: parse_action(args.trim(), line)?,
                    hold: Action::Modifier(modifier),
                })
            }
        };
    }

    Ok(Binding::Press(parse_action(raw, line)?))
}

/// `NAME(args)` -> (`NAME`, `args`)
fn split_call(raw: &str) -> Option<(&str, &str)> {
    let open = raw.find('(')?;
    let inner = raw[open + 1..].strip_suffix(')')?;
    Some((raw[..open].trim(), inner))
}

fn parse_action(raw: &str, line: usize) -> Result<Action, KeymapError> {
    let code = KeyCode::from_name(raw).ok_or_else(|| KeymapError::UnknownKey {
        line,
        token: raw.to_string(),
    })?;
    Ok(match code.modifier() {
        Some(m) => Action::Modifier(m),
        None => Action::Key(code),
    })
}
