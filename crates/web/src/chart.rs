use serde::Serialize;
use stockinfo_core::lookup::ClosePoint;

pub const CHART_WIDTH: f64 = 720.0;
pub const CHART_HEIGHT: f64 = 280.0;

/// SVG point lists for the close-price line and the area underneath it.
#[derive(Debug, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub points: String,
    pub area_points: String,
    pub min_price: f64,
    pub max_price: f64,
    pub min_label: String,
    pub max_label: String,
    pub first_date: String,
    pub last_date: String,
}

pub fn compute_chart_geometry(
    history: &[ClosePoint],
    width: f64,
    height: f64,
) -> Option<ChartGeometry> {
    if history.len() < 2 || width <= 0.0 || height <= 0.0 {
        return None;
    }

    let min_price = history
        .iter()
        .map(|point| point.close)
        .fold(f64::INFINITY, f64::min);
    let max_price = history
        .iter()
        .map(|point| point.close)
        .fold(f64::NEG_INFINITY, f64::max);

    if !min_price.is_finite() || !max_price.is_finite() {
        return None;
    }

    let first = history.first()?;
    let last = history.last()?;
    let day_span = ((last.date - first.date).num_days() as f64).max(1.0);
    // A flat series is drawn along the vertical middle.
    let price_span = max_price - min_price;

    let points_vec: Vec<String> = history
        .iter()
        .map(|point| {
            let x = ((point.date - first.date).num_days() as f64 / day_span) * width;
            let y = if price_span > f64::EPSILON {
                height - ((point.close - min_price) / price_span) * height
            } else {
                height / 2.0
            };
            format!("{:.2},{:.2}", x, y)
        })
        .collect();
    let points = points_vec.join(" ");
    let area_points = format!("{} {:.2},{:.2} 0,{:.2}", points, width, height, height);

    Some(ChartGeometry {
        width,
        height,
        points,
        area_points,
        min_price,
        max_price,
        min_label: format!("{:.2}", min_price),
        max_label: format!("{:.2}", max_price),
        first_date: first.date.to_string(),
        last_date: last.date.to_string(),
    })
}
