use crate::error::{PackerError, Result};
use crate::model::{Manifest, Placement, Rect};
use serde_json::{Value, json};

/// Render the texture-data manifest.
///
/// Line 1 is `<count> <width> <height>`; each following line is
/// `<name> <left> <right> <bottom> <top>` in name order. No trailing newline.
pub fn to_manifest_text(manifest: &Manifest) -> String {
    let mut out = format!(
        "{} {} {}",
        manifest.entries.len(),
        manifest.width,
        manifest.height
    );
    for e in &manifest.entries {
        out.push('\n');
        out.push_str(&format!(
            "{} {} {} {} {}",
            e.name, e.rect.left, e.rect.right, e.rect.bottom, e.rect.top
        ));
    }
    out
}

fn manifest_err(line: usize, message: impl Into<String>) -> PackerError {
    PackerError::Manifest {
        line,
        message: message.into(),
    }
}

fn parse_u32(field: Option<&str>, what: &str, line: usize) -> Result<u32> {
    let raw = field.ok_or_else(|| manifest_err(line, format!("missing {what}")))?;
    raw.parse()
        .map_err(|_| manifest_err(line, format!("invalid {what}: {raw:?}")))
}

/// Parse a manifest produced by [`to_manifest_text`].
///
/// Accepts a trailing newline and trailing whitespace on records. Entries are
/// returned in file order; a file whose entries are not name-sorted, whose
/// count disagrees with its header, or whose rects leave the atlas is rejected.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim_end()));

    let (header_no, header) = lines
        .next()
        .ok_or_else(|| manifest_err(1, "empty manifest"))?;
    let mut fields = header.split_whitespace();
    let count = parse_u32(fields.next(), "sprite count", header_no)? as usize;
    let width = parse_u32(fields.next(), "width", header_no)?;
    let height = parse_u32(fields.next(), "height", header_no)?;
    if fields.next().is_some() {
        return Err(manifest_err(header_no, "unexpected trailing field in header"));
    }
    let bounds = Rect::new(0, width, 0, height);

    // `count` is untrusted until the records have been read
    let mut entries: Vec<Placement> = Vec::new();
    for (line_no, line) in lines {
        if line.is_empty() {
            continue;
        }
        // Names may contain spaces; the four coordinates are always the last fields.
        let mut fields = line.rsplitn(5, ' ');
        let top = parse_u32(fields.next(), "top", line_no)?;
        let bottom = parse_u32(fields.next(), "bottom", line_no)?;
        let right = parse_u32(fields.next(), "right", line_no)?;
        let left = parse_u32(fields.next(), "left", line_no)?;
        let name = match fields.next() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Err(manifest_err(line_no, "missing name")),
        };
        if right <= left || top <= bottom {
            return Err(manifest_err(line_no, "empty or inverted rect"));
        }
        let rect = Rect::new(left, right, bottom, top);
        if !bounds.contains(&rect) {
            return Err(manifest_err(
                line_no,
                format!("rect of {name} lies outside {width}x{height}"),
            ));
        }
        if let Some(prev) = entries.last() {
            if prev.name >= name {
                return Err(manifest_err(
                    line_no,
                    format!("{name} is out of name order or duplicated"),
                ));
            }
        }
        entries.push(Placement { name, rect });
    }

    if entries.len() != count {
        return Err(manifest_err(
            header_no,
            format!("header announces {count} sprites, found {}", entries.len()),
        ));
    }
    Ok(Manifest {
        width,
        height,
        entries,
    })
}

/// JSON rendering of the manifest for tooling that prefers structured data.
/// Shape: `{ width, height, sprites: [{ name, left, right, bottom, top, width, height }] }`.
pub fn to_json(manifest: &Manifest) -> Value {
    let sprites: Vec<Value> = manifest
        .entries
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "left": e.rect.left,
                "right": e.rect.right,
                "bottom": e.rect.bottom,
                "top": e.rect.top,
                "width": e.rect.width(),
                "height": e.rect.height(),
            })
        })
        .collect();
    json!({
        "width": manifest.width,
        "height": manifest.height,
        "sprites": sprites,
    })
}
