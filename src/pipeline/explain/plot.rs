//! Horizontal bar chart of attributions rendered as SVG.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const WIDTH: f64 = 480.0;
const BAR_HEIGHT: f64 = 22.0;
const GAP: f64 = 8.0;
const LABEL_WIDTH: f64 = 90.0;
const MARGIN: f64 = 12.0;
const POSITIVE_FILL: &str = "#d9534f";
const NEGATIVE_FILL: &str = "#337ab7";

pub fn attribution_chart_svg(attributions: &[f64]) -> String {
    let rows = attributions.len().max(1) as f64;
    let height = MARGIN * 2.0 + rows * (BAR_HEIGHT + GAP);
    let plot_width = WIDTH - LABEL_WIDTH - MARGIN * 2.0;
    let axis_x = LABEL_WIDTH + MARGIN + plot_width / 2.0;
    let max_abs = attributions
        .iter()
        .map(|a| a.abs())
        .filter(|a| a.is_finite())
        .fold(0.0_f64, f64::max);
    let scale = if max_abs > 0.0 {
        (plot_width / 2.0) / max_abs
    } else {
        0.0
    };

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif" font-size="12">"#
    );
    svg.push_str(&format!(
        r##"<line x1="{axis_x:.1}" y1="{MARGIN}" x2="{axis_x:.1}" y2="{:.1}" stroke="#444" stroke-width="1"/>"##,
        height - MARGIN
    ));

    for (i, &value) in attributions.iter().enumerate() {
        let value = if value.is_finite() { value } else { 0.0 };
        let y = MARGIN + i as f64 * (BAR_HEIGHT + GAP);
        let length = value.abs() * scale;
        let (x, fill) = if value >= 0.0 {
            (axis_x, POSITIVE_FILL)
        } else {
            (axis_x - length, NEGATIVE_FILL)
        };
        svg.push_str(&format!(
            r#"<text x="{MARGIN}" y="{:.1}">feature {i}</text>"#,
            y + BAR_HEIGHT * 0.7
        ));
        svg.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="{length:.1}" height="{BAR_HEIGHT}" fill="{fill}"><title>{value:.4}</title></rect>"#
        ));
    }

    svg.push_str("</svg>");
    svg
}

pub fn attribution_chart_base64(attributions: &[f64]) -> String {
    STANDARD.encode(attribution_chart_svg(attributions))
}
