//! SVG geometry for dashboard charts.

use serde::Serialize;

use super::share::{balance_shares, FULL_SHARE};

pub const DEFAULT_GAP_DEGREES: f64 = 2.0;
pub const START_ANGLE_DEGREES: f64 = -90.0;

pub const PALETTE: [&str; 6] = [
    "#2563eb", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#0ea5e9",
];

const SCORE_STOPS: [(f64, [u8; 3]); 4] = [
    (0.0, [0xDB, 0x14, 0x14]),
    (0.33, [0xf5, 0x9e, 0x0b]),
    (0.66, [0x22, 0xc5, 0x5e]),
    (1.0, [0x0e, 0xa5, 0xe9]),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub gap_degrees: f64,
}

impl Default for DonutGeometry {
    fn default() -> Self {
        Self {
            center_x: 70.0,
            center_y: 70.0,
            radius: 56.0,
            gap_degrees: DEFAULT_GAP_DEGREES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSegment {
    pub id: String,
    /// Tooltip text; the id until a caller names the segment.
    pub label: String,
    pub amount: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub sweep: f64,
    pub ratio: f64,
    pub path: String,
}

fn point_on_circle(geometry: &DonutGeometry, angle_degrees: f64) -> (f64, f64) {
    let radians = angle_degrees.to_radians();
    (
        geometry.center_x + geometry.radius * radians.cos(),
        geometry.center_y + geometry.radius * radians.sin(),
    )
}

pub fn arc_path(geometry: &DonutGeometry, start: f64, end: f64) -> String {
    let (x1, y1) = point_on_circle(geometry, start);
    let (x2, y2) = point_on_circle(geometry, end);
    let large_arc = u8::from(end - start > 180.0);

    format!(
        "M {:.3} {:.3} A {} {} 0 {} 1 {:.3} {:.3}",
        x1, y1, geometry.radius, geometry.radius, large_arc, x2, y2
    )
}

/// Clockwise arcs from the top. Every drawn segment is followed by one gap,
/// so the arcs share `360 - n * gap` degrees in proportion to their amounts.
/// Non-positive amounts are left out.
pub fn donut_segments<S: AsRef<str>>(
    items: &[(S, f64)],
    geometry: &DonutGeometry,
) -> Vec<DonutSegment> {
    let drawn: Vec<(&str, f64)> = items
        .iter()
        .filter(|(_, amount)| amount.is_finite() && *amount > 0.0)
        .map(|(id, amount)| (id.as_ref(), *amount))
        .collect();

    let total: f64 = drawn.iter().map(|(_, amount)| amount).sum();
    if drawn.is_empty() || total <= 0.0 {
        return vec![];
    }

    let gap = geometry.gap_degrees.max(0.0);
    let budget = (360.0 - gap * drawn.len() as f64).max(0.0);
    let mut start = START_ANGLE_DEGREES;

    drawn
        .into_iter()
        .map(|(id, amount)| {
            let ratio = amount / total;
            let sweep = ratio * budget;
            let end = start + sweep;
            let segment = DonutSegment {
                id: id.to_owned(),
                label: id.to_owned(),
                amount,
                start_angle: start,
                end_angle: end,
                sweep,
                ratio,
                path: arc_path(geometry, start, end),
            };
            start = end + gap;
            segment
        })
        .collect()
}

/// Integer legend percentages from the same ratios that size the arcs,
/// balanced to sum to 100. Zero amounts get 0.
pub fn legend_percentages(amounts: &[f64]) -> Vec<u32> {
    if amounts.iter().all(|a| !(a.is_finite() && *a > 0.0)) {
        return vec![0; amounts.len()];
    }

    balance_shares(amounts)
}

pub fn render_donut_svg(segments: &[DonutSegment], geometry: &DonutGeometry) -> String {
    let size = (geometry.center_x.max(geometry.center_y) * 2.0).ceil();
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="0 0 {0} {0}">"#,
        size
    );

    for (index, segment) in segments.iter().enumerate() {
        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="16"><title>{}: {:.1}%</title></path>"#,
            segment.path,
            PALETTE[index % PALETTE.len()],
            segment.label,
            segment.ratio * f64::from(FULL_SHARE)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn score_progress(score: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return 0.0;
    }

    ((score - min) / range).clamp(0.0, 1.0)
}

/// Hex colour of a credit score, linearly interpolated between the red,
/// amber, green and blue stops.
pub fn score_color(score: f64, min: f64, max: f64) -> String {
    let progress = score_progress(score, min, max);

    for window in SCORE_STOPS.windows(2) {
        let (start, from) = window[0];
        let (end, to) = window[1];

        if progress >= start && progress <= end {
            let local = (progress - start) / (end - start);
            let channel = |i: usize| {
                let a = f64::from(from[i]);
                let b = f64::from(to[i]);
                (a + (b - a) * local).round() as u8
            };
            return format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2));
        }
    }

    let [r, g, b] = SCORE_STOPS[SCORE_STOPS.len() - 1].1;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

pub fn indicator_position(score: f64, min: f64, max: f64, width: f64) -> f64 {
    score_progress(score, min, max) * width
}

pub fn payoff_percent(paid: f64, total: f64) -> u32 {
    if total <= 0.0 || !total.is_finite() {
        return 0;
    }

    ((paid / total) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Polyline points for a series: x evenly spread over `width`, y inverted
/// against the series maximum and clamped to `[0, height]`.
pub fn line_points(values: &[f64], width: f64, height: f64) -> Vec<(f64, f64)> {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let steps = values.len().saturating_sub(1).max(1) as f64;

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let x = index as f64 / steps * width;
            let y = if max > 0.0 {
                height - (value / max) * height
            } else {
                height
            };
            (x, y.clamp(0.0, height))
        })
        .collect()
}

pub fn polyline(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}
