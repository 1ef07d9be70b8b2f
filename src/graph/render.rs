use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::dataset::GraphData;
use super::simulation::LayoutSnapshot;

const NODE_RADIUS: f64 = 12.0;
const LABEL_DX: f64 = 15.0;
const LABEL_DY: f64 = 4.0;
const EDGE_COLOR: &str = "hsl(195, 90%, 45%)";
const LABEL_COLOR: &str = "hsl(210, 40%, 98%)";
const BACKGROUND: &str = "hsl(222, 47%, 11%)";

/// Render the graph at the positions held in `snapshot` as an SVG document.
///
/// Edges are drawn first, then nodes, then labels, so labels stay on top.
/// Nodes missing from the snapshot are skipped along with their edges.
pub fn render_svg(data: &GraphData, snapshot: &LayoutSnapshot, width: f64, height: f64) -> String {
    let positions: HashMap<&str, (f64, f64)> = snapshot
        .nodes
        .iter()
        .map(|p| (p.id.as_str(), (p.x, p.y)))
        .collect();

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(width),
        h = fmt_num(height),
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{BACKGROUND}"/>"#);

    let _ = writeln!(
        svg,
        r#"  <g class="links" stroke="{EDGE_COLOR}" stroke-opacity="0.3">"#
    );
    for edge in &data.edges {
        let (Some(&(x1, y1)), Some(&(x2, y2))) = (
            positions.get(edge.source.as_str()),
            positions.get(edge.target.as_str()),
        ) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}"/>"#,
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            fmt_num(edge.weight.sqrt() * 2.0),
        );
    }
    svg.push_str("  </g>\n");

    svg.push_str("  <g class=\"nodes\" stroke=\"#fff\" stroke-width=\"2\">\n");
    for node in &data.nodes {
        let Some(&(x, y)) = positions.get(node.id.as_str()) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r#"    <circle id="{}" cx="{}" cy="{}" r="{}" fill="{}"><title>{}</title></circle>"#,
            escape_xml(&node.id),
            fmt_num(x),
            fmt_num(y),
            fmt_num(NODE_RADIUS),
            node.group.color(),
            escape_xml(&node.name),
        );
    }
    svg.push_str("  </g>\n");

    let _ = writeln!(
        svg,
        r#"  <g class="labels" font-size="12" font-family="sans-serif" fill="{LABEL_COLOR}">"#
    );
    for node in &data.nodes {
        let Some(&(x, y)) = positions.get(node.id.as_str()) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r#"    <text x="{}" y="{}">{}</text>"#,
            fmt_num(x + LABEL_DX),
            fmt_num(y + LABEL_DY),
            escape_xml(&node.name),
        );
    }
    svg.push_str("  </g>\n</svg>\n");

    svg
}

/// Write the rendered SVG to `path`
pub fn write_svg(
    data: &GraphData,
    snapshot: &LayoutSnapshot,
    width: f64,
    height: f64,
    path: &Path,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_svg(data, snapshot, width, height).as_bytes())
        .context("Failed to write SVG")?;
    writer.flush()?;
    Ok(())
}

fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
