// src/actions/sprite.rs

//! Inline SVG sprite: every icon becomes a `<symbol>` in one hidden `<svg>`
//! that is injected into a template partial between two marker comments.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::model::IconsSection;
use crate::errors::{PipelineError, Result};
use crate::fs::{list_files_sorted, FileSystem};

static XML_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\?xml[^>]*\?>").expect("valid regex"));
static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").expect("valid regex"));
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<metadata\b[^>]*/>|<metadata\b.*?</metadata>").expect("valid regex")
});
static BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));
static SVG_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^<svg\b([^>]*?)(?:/>|>(.*)</svg>)$").expect("valid regex")
});
static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bviewBox\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Opening tag of the sprite container.
pub const SPRITE_OPEN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" style="display:none">"#;

/// Drop the XML declaration, DOCTYPE, comments and `<metadata>`, and
/// collapse whitespace between tags. Text content is left alone.
pub fn minify_svg(svg: &str) -> String {
    let out = XML_DECL.replace_all(svg, "");
    let out = DOCTYPE.replace_all(&out, "");
    let out = COMMENT.replace_all(&out, "");
    let out = METADATA.replace_all(&out, "");
    let out = BETWEEN_TAGS.replace_all(&out, "><");
    out.trim().to_string()
}

/// Turn a minified `<svg ...>` document into `<symbol id=... viewBox=...>`.
///
/// Only `viewBox` is carried over from the root element.
pub fn svg_to_symbol(id: &str, minified: &str) -> Result<String> {
    let caps = SVG_ROOT.captures(minified).ok_or_else(|| {
        PipelineError::Template(format!("icon '{id}' has no <svg> root element"))
    })?;

    let attrs = caps.get(1).map_or("", |m| m.as_str());
    let inner = caps.get(2).map_or("", |m| m.as_str());

    let view_box = VIEW_BOX
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str());

    Ok(match view_box {
        Some(vb) => format!(r#"<symbol id="{id}" viewBox="{vb}">{inner}</symbol>"#),
        None => format!(r#"<symbol id="{id}">{inner}</symbol>"#),
    })
}

/// Build the sprite from every `*.svg` directly inside `source`, in file
/// name order. Symbol ids are `id_prefix` followed by the file stem.
pub fn build_sprite(fs: &dyn FileSystem, source: &Path, id_prefix: &str) -> Result<String> {
    let mut sprite = String::from(SPRITE_OPEN);
    let mut count = 0usize;

    for file in list_files_sorted(fs, source)? {
        if file.extension().and_then(|e| e.to_str()) != Some("svg") {
            continue;
        }
        let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let svg = fs.read_to_string(&file)?;
        sprite.push_str(&svg_to_symbol(&format!("{id_prefix}{stem}"), &minify_svg(&svg))?);
        count += 1;
    }

    sprite.push_str("</svg>");
    debug!(icons = count, "built icon sprite");
    Ok(sprite)
}

/// Replace whatever sits between `start` and `end` in `template` with
/// `content`. Both markers stay in place.
pub fn inject_between_markers(template: &str, start: &str, end: &str, content: &str) -> Result<String> {
    let start_idx = template
        .find(start)
        .ok_or_else(|| PipelineError::Template(format!("start marker `{start}` not found")))?;
    let body_idx = start_idx + start.len();
    let end_idx = template[body_idx..]
        .find(end)
        .map(|i| body_idx + i)
        .ok_or_else(|| PipelineError::Template(format!("end marker `{end}` not found after start marker")))?;

    let mut out = String::with_capacity(template.len() + content.len());
    out.push_str(&template[..body_idx]);
    out.push_str(content);
    out.push_str(&template[end_idx..]);
    Ok(out)
}

/// Rebuild the sprite and inject it into the partial below `root`.
///
/// Returns whether the partial changed; an unchanged partial is not
/// rewritten.
pub fn update_icon_partial(fs: &dyn FileSystem, root: &Path, icons: &IconsSection) -> Result<bool> {
    let sprite = build_sprite(fs, &root.join(&icons.source), &icons.id_prefix)?;

    let partial = root.join(&icons.partial);
    let current = fs.read_to_string(&partial)?;
    let updated = inject_between_markers(&current, &icons.start_marker, &icons.end_marker, &sprite)
        .map_err(|err| match err {
            PipelineError::Template(msg) => PipelineError::Template(format!("{}: {msg}", partial.display())),
            other => other,
        })?;

    if updated == current {
        debug!(partial = ?partial, "icon sprite unchanged");
        return Ok(false);
    }

    fs.write(&partial, updated.as_bytes())?;
    info!(partial = ?partial, "icon sprite injected");
    Ok(true)
}
