use crate::config::RenderConfig;
use crate::layout::{BlockLayout, HierarchicalLayoutResult, Position3D};
use crate::theme::Theme;
use anyhow::Result;
use std::f32::consts::TAU;
use std::path::Path;

/// Maps ground-plane coordinates (x, z) onto the SVG canvas.
struct Projection {
    cx: f32,
    cy: f32,
    scale: f32,
}

impl Projection {
    fn fit(result: &HierarchicalLayoutResult, cfg: &RenderConfig) -> Self {
        let b = &result.bounds;
        let widest = result
            .districts
            .iter()
            .flat_map(|d| d.blocks.iter())
            .chain(result.center_blocks.iter())
            .map(|block| block.footprint.width.max(block.footprint.depth))
            .fold(0.0f32, f32::max);
        let extent = [b.min.x, b.max.x, b.min.z, b.max.z]
            .iter()
            .map(|v| v.abs())
            .fold(0.0f32, f32::max)
            + widest / 2.0;
        let half = (cfg.width.min(cfg.height) / 2.0 - cfg.margin).max(1.0);
        Self {
            cx: cfg.width / 2.0,
            cy: cfg.height / 2.0,
            scale: half / extent.max(1.0),
        }
    }

    fn point(&self, p: Position3D) -> (f32, f32) {
        (self.cx + p.x * self.scale, self.cy + p.z * self.scale)
    }

    fn len(&self, v: f32) -> f32 {
        v * self.scale
    }
}

pub fn render_svg(result: &HierarchicalLayoutResult, theme: &Theme, cfg: &RenderConfig) -> String {
    let proj = Projection::fit(result, cfg);
    let width = cfg.width;
    let height = cfg.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    let mut radii: Vec<f32> = result
        .districts
        .iter()
        .map(|d| d.ring_radius)
        .chain(result.external_zones.iter().map(|z| z.ring_radius))
        .collect();
    radii.sort_by(f32::total_cmp);
    radii.dedup();
    for radius in radii {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"4 4\"/>",
            proj.cx,
            proj.cy,
            proj.len(radius),
            theme.ring_color
        ));
    }

    let band = result
        .districts
        .iter()
        .flat_map(|d| d.blocks.iter())
        .map(|block| block.footprint.depth)
        .fold(0.0f32, f32::max)
        + 2.0;
    for district in &result.districts {
        svg.push_str(&arc_path(
            &proj,
            district.ring_radius,
            district.arc_start,
            district.arc_end,
            &theme.district_fill,
            proj.len(band).max(3.0),
        ));
        svg.push_str(&arc_path(
            &proj,
            district.ring_radius,
            district.arc_start,
            district.arc_end,
            &theme.district_stroke,
            3.0,
        ));
        let mid = (district.arc_start + district.arc_end) / 2.0;
        let (lx, ly) = proj.point(Position3D::on_ring(district.ring_radius, mid));
        svg.push_str(&format!(
            "<text x=\"{lx:.2}\" y=\"{ly:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.font_family,
            theme.font_size,
            theme.text_color,
            escape_xml(&district.district_id)
        ));
    }

    for district in &result.districts {
        for block in &district.blocks {
            svg.push_str(&block_svg(&proj, block, theme, &theme.block_stroke));
        }
    }
    for block in &result.center_blocks {
        svg.push_str(&block_svg(&proj, block, theme, &theme.entry_color));
    }

    for (idx, zone) in result.external_zones.iter().enumerate() {
        let color = theme.zone_color(idx);
        svg.push_str(&arc_path(
            &proj,
            zone.ring_radius,
            zone.arc_start,
            zone.arc_end,
            color,
            3.0,
        ));
        for node in &zone.nodes {
            let (x, y) = proj.point(node.position);
            svg.push_str(&format!(
                "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"{color}\"><title>{}</title></circle>",
                proj.len(1.5).max(2.0),
                escape_xml(&node.node_id)
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn arc_path(
    proj: &Projection,
    radius: f32,
    start: f32,
    end: f32,
    stroke: &str,
    width: f32,
) -> String {
    let span = end - start;
    if span <= 0.0 {
        return String::new();
    }
    let r = proj.len(radius);
    if span >= TAU - 1e-4 {
        return format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{r:.2}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width:.2}\" stroke-opacity=\"0.5\"/>",
            proj.cx, proj.cy
        );
    }
    let (x0, y0) = proj.point(Position3D::on_ring(radius, start));
    let (x1, y1) = proj.point(Position3D::on_ring(radius, end));
    let large = if span > std::f32::consts::PI { 1 } else { 0 };
    format!(
        "<path d=\"M {x0:.2} {y0:.2} A {r:.2} {r:.2} 0 {large} 1 {x1:.2} {y1:.2}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width:.2}\" stroke-opacity=\"0.5\"/>"
    )
}

fn block_svg(proj: &Projection, block: &BlockLayout, theme: &Theme, stroke: &str) -> String {
    let (x, y) = proj.point(block.position);
    let w = proj.len(block.footprint.width);
    let h = proj.len(block.footprint.depth);
    let fill = if block.is_merged {
        theme.merged_block_fill.as_str()
    } else {
        theme.block_fill.as_str()
    };
    let mut out = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"1\"><title>{}</title></rect>",
        x - w / 2.0,
        y - h / 2.0,
        escape_xml(&block.merged_file_ids.join(", "))
    );
    for child in &block.children {
        let (cx, cy) = proj.point(block.position.offset(child.local_position));
        out.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            proj.len(0.4).max(1.0),
            theme.child_color
        ));
    }
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
