//! Derives the chart group from the active candles and enabled indicators.
//!
//! A rebuild first clears the whole chart layer, then spawns the new
//! primitives, so the layer is never a mix of old and new state.

use glam::Vec3;
use rand::Rng;

use super::config::ChartLayout;
use crate::domain::chart::Indicator;
use crate::domain::market_data::{CandleRecord, Timeframe};
use crate::ecs::SceneGraph;
use crate::ecs::components::{EntranceAnimation, Layer, PrimitiveKind, Pulse, Transform};
use crate::ecs::resources::{Color, GeometryDesc, MaterialDesc};
use crate::ecs::systems;
use crate::view_state::ViewState;

const LABEL_SIZE: (f32, f32, f32) = (1.5, 0.3, 0.05);
const LABEL_COLOR: Color = Color(0x3377ff);
const MARKER_SIZE: f32 = 0.06;
const MARKER_SPACING: f32 = 0.12;
const MARKER_RING_RADIUS: f32 = 0.25;
const GLOW_SIZE: f32 = 0.03;
const GLOW_OPACITY: f32 = 0.8;

/// What a rebuild produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartSummary {
    pub candles: usize,
    pub curves: usize,
    pub glow_points: usize,
    pub badge_markers: usize,
}

/// Horizontal position of candle `index` in a sequence of `count`.
pub fn candle_x(index: usize, count: usize, spacing: f32) -> f32 {
    index as f32 * spacing - count as f32 * spacing * 0.5
}

pub fn badge_color(timeframe: Timeframe) -> Color {
    match timeframe {
        Timeframe::Short => Color(0x00ffff),
        Timeframe::Medium => Color(0xffff00),
        Timeframe::Long => Color(0xff00ff),
    }
}

/// Marker offsets relative to the badge centre: a line for up to four
/// markers, a ring otherwise.
pub fn badge_layout(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            if count <= 4 {
                Vec3::new((i as f32 - (count as f32 - 1.0) / 2.0) * MARKER_SPACING, 0.0, 0.0)
            } else {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                Vec3::new(angle.cos() * MARKER_RING_RADIUS, angle.sin() * MARKER_RING_RADIUS, 0.0)
            }
        })
        .collect()
}

/// Centripetal Catmull-Rom spline through `points`, evaluated at `t` in [0, 1].
pub fn catmull_rom_point(points: &[Vec3], t: f32) -> Vec3 {
    match points.len() {
        0 => return Vec3::ZERO,
        1 => return points[0],
        _ => {}
    }
    let last = points.len() - 1;
    let p = last as f32 * t.clamp(0.0, 1.0);
    let mut index = p.floor() as usize;
    let mut weight = p - index as f32;
    if index >= last {
        index = last - 1;
        weight = 1.0;
    }

    let p1 = points[index];
    let p2 = points[index + 1];
    let p0 = if index > 0 { points[index - 1] } else { p1 * 2.0 - p2 };
    let p3 = if index + 2 <= last { points[index + 2] } else { p2 * 2.0 - p1 };

    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let c0 = p1;
    let c1 = t1;
    let c2 = p1 * -3.0 + p2 * 3.0 - t1 * 2.0 - t2;
    let c3 = p1 * 2.0 - p2 * 2.0 + t1 + t2;
    c0 + c1 * weight + c2 * weight * weight + c3 * weight * weight * weight
}

/// `divisions + 1` evenly spaced samples along the spline.
pub fn sample_curve(points: &[Vec3], divisions: usize) -> Vec<Vec3> {
    if points.is_empty() {
        return Vec::new();
    }
    let divisions = divisions.max(1);
    (0..=divisions).map(|d| catmull_rom_point(points, d as f32 / divisions as f32)).collect()
}

/// Control points of an indicator curve: the close price through the
/// indicator's fixed linear transform.
pub fn indicator_points(candles: &[CandleRecord], indicator: Indicator, layout: &ChartLayout) -> Vec<Vec3> {
    let style = indicator.curve_style();
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            Vec3::new(
                candle_x(i, candles.len(), layout.candle_spacing),
                candle.close.value() as f32 * style.scale + style.offset,
                0.0,
            )
        })
        .collect()
}

/// Replace the chart layer with primitives for `candles` and `view`.
pub fn rebuild_chart<R: Rng>(
    graph: &mut SceneGraph,
    candles: &[CandleRecord],
    view: &ViewState,
    layout: &ChartLayout,
    now_ms: f64,
    rng: &mut R,
) -> ChartSummary {
    graph.clear_layer(Layer::Chart);
    let mut summary = ChartSummary::default();
    let count = candles.len();

    for (i, candle) in candles.iter().enumerate() {
        let x = candle_x(i, count, layout.candle_spacing);
        let color =
            if candle.is_bullish() { Color(layout.bullish_color) } else { Color(layout.bearish_color) };

        let body = graph.spawn_primitive(
            PrimitiveKind::CandleBody,
            Layer::Chart,
            GeometryDesc::Box {
                width: layout.body_width,
                height: candle.body_size() as f32 * layout.price_scale,
                depth: layout.body_width,
            },
            MaterialDesc::glowing(color, 0.2, 0.7, 0.3),
            Transform::at(Vec3::new(x, 0.0, 0.0)),
        );
        graph.with_component(
            body,
            EntranceAnimation {
                start_ms: now_ms + i as f64 * layout.entrance_stagger_ms,
                duration_ms: layout.entrance_duration_ms,
                from_y: layout.entrance_from_y,
                to_y: 0.0,
            },
        );

        graph.spawn_primitive(
            PrimitiveKind::Wick,
            Layer::Chart,
            GeometryDesc::Box {
                width: layout.wick_width,
                height: candle.range() as f32 * layout.price_scale,
                depth: layout.wick_width,
            },
            MaterialDesc::standard(Color::WHITE, 0.5, 0.5),
            Transform::at(Vec3::new(x, 0.0, 0.0)),
        );
        summary.candles += 1;
    }

    for indicator in view.enabled_indicators.iter().copied() {
        let points = indicator_points(candles, indicator, layout);
        if points.is_empty() {
            continue;
        }
        let style = indicator.curve_style();
        graph.spawn_primitive(
            PrimitiveKind::IndicatorCurve(indicator),
            Layer::Chart,
            GeometryDesc::Polyline { points: sample_curve(&points, layout.curve_samples) },
            MaterialDesc::Line { color: Color(style.color) },
            Transform::default(),
        );
        summary.curves += 1;

        if indicator.has_glow() && layout.glow_points > 0 {
            let steps = layout.glow_points.saturating_sub(1).max(1) as f32;
            let positions: Vec<Vec3> =
                (0..layout.glow_points).map(|i| catmull_rom_point(&points, i as f32 / steps)).collect();
            summary.glow_points += positions.len();
            graph.spawn_primitive(
                PrimitiveKind::IndicatorGlow(indicator),
                Layer::Chart,
                GeometryDesc::Points { positions },
                MaterialDesc::Points { color: Color(style.color), size: GLOW_SIZE, opacity: GLOW_OPACITY },
                Transform::default(),
            );
        }
    }

    graph.spawn_primitive(
        PrimitiveKind::TitleLabel,
        Layer::Chart,
        GeometryDesc::Box { width: LABEL_SIZE.0, height: LABEL_SIZE.1, depth: LABEL_SIZE.2 },
        MaterialDesc::glowing(LABEL_COLOR, 0.3, 0.7, 0.2),
        Transform::at(Vec3::from(layout.label_position)),
    );

    let badge_origin = Vec3::from(layout.badge_position);
    let color = badge_color(view.active_timeframe);
    for (i, offset) in badge_layout(view.active_timeframe.badge_markers()).into_iter().enumerate() {
        let rest = badge_origin + offset;
        let marker = graph.spawn_primitive(
            PrimitiveKind::BadgeMarker,
            Layer::Chart,
            GeometryDesc::Box { width: MARKER_SIZE, height: MARKER_SIZE, depth: MARKER_SIZE },
            MaterialDesc::glowing(color, 0.7, 0.8, 0.2),
            Transform::at(rest),
        );
        graph.with_component(
            marker,
            Pulse {
                origin_y: rest.y,
                speed: 1.5 + rng.r#gen::<f32>() * 0.5,
                height: 0.02 + rng.r#gen::<f32>() * 0.02,
                phase_start_ms: now_ms + i as f64 * 100.0,
            },
        );
        summary.badge_markers += 1;
    }

    // place delayed bodies at their start height before the first frame
    systems::run_entrance_animations(&mut graph.world, now_ms);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candles_are_centred_around_origin() {
        assert_eq!(candle_x(0, 5, 0.5), -1.25);
        assert_eq!(candle_x(4, 5, 0.5), 0.75);
    }

    #[test]
    fn spline_interpolates_control_points() {
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.0), Vec3::new(2.0, 1.0, 0.0)];
        assert!((catmull_rom_point(&points, 0.0) - points[0]).length() < 1e-5);
        assert!((catmull_rom_point(&points, 0.5) - points[1]).length() < 1e-5);
        assert!((catmull_rom_point(&points, 1.0) - points[2]).length() < 1e-5);
        assert_eq!(sample_curve(&points, 50).len(), 51);
    }

    #[test]
    fn ring_badge_has_constant_radius() {
        let layout = badge_layout(24);
        assert_eq!(layout.len(), 24);
        assert!(layout.iter().all(|p| (p.length() - MARKER_RING_RADIUS).abs() < 1e-5));
        assert_eq!(badge_layout(1), vec![Vec3::ZERO]);
    }
}
