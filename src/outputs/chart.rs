//! SVG rendering of the series collection.
//!
//! One chart, two wrappers: `plot.svg` is the standalone image, `plot.html`
//! embeds it in a minimal page. The y axis is logarithmic base 2 with a
//! gridline and label at every power of two, which turns exponential growth
//! into straight lines and makes the doubling period readable straight off
//! the slope. The x axis carries one gridline per day.
//!
//! Every data point gets a `<title>` child, so hovering in a browser shows
//! the exact date and count. Curves are labelled twice: in the legend and
//! with their newest value at the right margin.

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::ops::Range;
use std::path::Path;

use chrono::NaiveDate;
use svg::Document;
use svg::node::element::{Circle, Group, Line, Polyline, Rectangle, Text as TextElement, Title};
use tracing::info;

use crate::series::{Series, SeriesCollection, day_number};

pub const TITLE: &str = "Регионы с наибольшим числом заболевших";
pub const Y_LABEL: &str = "Подтверждённые случаи";

const WIDTH: f64 = 1280.0;
const HEIGHT: f64 = 960.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 180.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 90.0;

/// Fallback colors for series without a fixed one, in assignment order.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Coordinate mapping from dates and counts into the plot area.
struct Frame {
    x_domain: Range<f64>,
    y_domain: Range<f64>,
    plot_x: Range<f64>,
    plot_y: Range<f64>,
    /// Highest power of two on the y axis.
    y_exponent: i32,
}

impl Frame {
    fn of(collection: &SeriesCollection) -> Frame {
        // One day of padding on the right so the newest markers stay inside
        let x_domain = match (collection.dates.last(), collection.dates.first()) {
            (Some(&oldest), Some(&newest)) => day_number(oldest)..day_number(newest) + 1.0,
            _ => 0.0..1.0,
        };
        let max_value = collection
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .filter(|v| v.is_finite())
            .fold(1.0_f64, |max, &v| max.max(v));
        // Tick labels are u128 powers of two, which caps the exponent at 127
        let y_exponent = (max_value.log2().ceil() as i32).clamp(1, 127);

        Frame {
            x_domain,
            y_domain: 0.0..y_exponent as f64,
            plot_x: MARGIN_LEFT..(WIDTH - MARGIN_RIGHT),
            plot_y: (HEIGHT - MARGIN_BOTTOM)..MARGIN_TOP,
            y_exponent,
        }
    }

    fn x(&self, date: NaiveDate) -> f64 {
        map_float(day_number(date), self.x_domain.clone(), self.plot_x.clone())
    }

    /// `value` must be positive; the axis is logarithmic.
    fn y(&self, value: f64) -> f64 {
        map_float(value.log2(), self.y_domain.clone(), self.plot_y.clone())
    }

    fn y_gridline(&self, exponent: i32) -> f64 {
        map_float(exponent as f64, self.y_domain.clone(), self.plot_y.clone())
    }
}

/// Render the whole chart as an SVG document tree.
pub fn render_document(collection: &SeriesCollection) -> Document {
    let frame = Frame::of(collection);

    let mut document = Document::new()
        .set("viewBox", (0, 0, WIDTH as i64, HEIGHT as i64))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .set("font-family", "sans-serif")
        .add(
            Rectangle::new()
                .set("width", WIDTH)
                .set("height", HEIGHT)
                .set("fill", "white"),
        );

    document = add_y_grid(document, &frame);
    document = add_x_grid(document, collection, &frame);
    document = document.add(
        Rectangle::new()
            .set("x", frame.plot_x.start)
            .set("y", frame.plot_y.end)
            .set("width", frame.plot_x.end - frame.plot_x.start)
            .set("height", frame.plot_y.start - frame.plot_y.end)
            .set("fill", "none")
            .set("stroke", "black"),
    );

    for (series, color) in with_colors(collection) {
        document = add_series(document, collection, series, color, &frame);
    }

    document = add_legend(document, collection, &frame);
    document
        .add(
            TextElement::new(TITLE)
                .set("x", WIDTH / 2.0)
                .set("y", 42)
                .set("font-size", 32)
                .set("text-anchor", "middle"),
        )
        .add(
            TextElement::new(Y_LABEL)
                .set("x", 24)
                .set("y", HEIGHT / 2.0)
                .set("font-size", 16)
                .set("text-anchor", "middle")
                .set("transform", format!("rotate(-90 24 {})", HEIGHT / 2.0)),
        )
}

/// Render the chart wrapped in a minimal standalone page.
pub fn render_html(collection: &SeriesCollection) -> String {
    let document = render_document(collection);
    format!(
        "<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{TITLE}</title>\n\
         <style>body {{ margin: 1em auto; max-width: {WIDTH}px; }} svg {{ width: 100%; height: auto; }}</style>\n\
         </head>\n<body>\n{document}\n</body>\n</html>\n"
    )
}

/// Write the standalone SVG image.
pub fn write_svg(collection: &SeriesCollection, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    let document = render_document(collection);
    svg::write(BufWriter::new(File::create(path)?), &document)?;
    info!(path = %path.display(), series = collection.series.len(), "Wrote SVG chart");
    Ok(())
}

/// Write the HTML page embedding the chart.
pub fn write_html(collection: &SeriesCollection, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    fs::write(path, render_html(collection))?;
    info!(path = %path.display(), "Wrote HTML chart page");
    Ok(())
}

/// Pair every series with its effective color, assigning palette colors to
/// series that do not carry one. Assignment order is stable so the legend
/// matches the curves.
fn with_colors(collection: &SeriesCollection) -> Vec<(&Series, &'static str)> {
    let mut fallback = 0usize;
    collection
        .series
        .iter()
        .map(|series| {
            let color = match series.color {
                Some(color) => color,
                None => {
                    let color = PALETTE[fallback % PALETTE.len()];
                    fallback += 1;
                    color
                }
            };
            (series, color)
        })
        .collect()
}

/// Horizontal gridlines and tick labels at every power of two.
fn add_y_grid(mut document: Document, frame: &Frame) -> Document {
    for exponent in 0..=frame.y_exponent {
        let y = frame.y_gridline(exponent);
        document = document
            .add(
                Line::new()
                    .set("x1", frame.plot_x.start)
                    .set("y1", y)
                    .set("x2", frame.plot_x.end)
                    .set("y2", y)
                    .set("stroke", "#dddddd"),
            )
            .add(
                TextElement::new((1u128 << exponent).to_string())
                    .set("x", frame.plot_x.start - 8.0)
                    .set("y", y + 5.0)
                    .set("font-size", 14)
                    .set("text-anchor", "end"),
            );
    }
    document
}

/// Vertical gridlines and rotated labels, one per day.
fn add_x_grid(mut document: Document, collection: &SeriesCollection, frame: &Frame) -> Document {
    let (Some(&newest), Some(&oldest)) = (collection.dates.first(), collection.dates.last()) else {
        return document;
    };

    let mut day = oldest;
    loop {
        let x = frame.x(day);
        document = document
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", frame.plot_y.start)
                    .set("x2", x)
                    .set("y2", frame.plot_y.end)
                    .set("stroke", "#eeeeee"),
            )
            .add(
                TextElement::new(day.format("%m-%d").to_string())
                    .set("x", x)
                    .set("y", frame.plot_y.start + 16.0)
                    .set("font-size", 13)
                    .set("text-anchor", "end")
                    .set("transform", format!("rotate(-70 {x} {})", frame.plot_y.start + 16.0)),
            );
        if day >= newest {
            break;
        }
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    document
}

/// One curve: polyline, point markers with hover titles, margin label.
fn add_series(
    mut document: Document,
    collection: &SeriesCollection,
    series: &Series,
    color: &str,
    frame: &Frame,
) -> Document {
    // Chronological order so the polyline runs left to right; counts below
    // one case or non-finite projections cannot be placed on a log scale
    // and are not drawn
    let points: Vec<(f64, f64, NaiveDate, f64)> = collection
        .dates
        .iter()
        .zip(&series.values)
        .rev()
        .filter_map(|(&date, value)| match value {
            Some(v) if *v >= 1.0 && v.is_finite() => {
                Some((frame.x(date), frame.y(*v), date, *v))
            }
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return document;
    }

    if !series.markers_only {
        let path: String = points
            .iter()
            .map(|(x, y, _, _)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        let mut line = Polyline::new()
            .set("points", path)
            .set("fill", "none")
            .set("stroke", color)
            .set("stroke-width", 2);
        if series.dashed {
            line = line.set("stroke-dasharray", "8 6");
        }
        document = document.add(line);
    }

    for &(x, y, date, value) in &points {
        let title = Title::new(format!("{date}: {value} - {}", series.name));
        if series.markers_only {
            document = document.add(
                Group::new()
                    .set("stroke", color)
                    .set("stroke-width", 2)
                    .add(Line::new().set("x1", x - 4.0).set("y1", y).set("x2", x + 4.0).set("y2", y))
                    .add(Line::new().set("x1", x).set("y1", y - 4.0).set("x2", x).set("y2", y + 4.0))
                    .add(title),
            );
        } else if !series.dashed {
            document = document.add(
                Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", 3)
                    .set("fill", color)
                    .add(title),
            );
        }
    }

    if series.annotate {
        if let Some(&(x, y, _, value)) = points.last() {
            document = document.add(
                TextElement::new(format!("{value} - {}", series.name))
                    .set("x", x + 6.0)
                    .set("y", y + 4.0)
                    .set("font-size", 15)
                    .set("fill", color),
            );
        }
    }
    document
}

/// Legend block in the top-left corner of the plot area.
fn add_legend(mut document: Document, collection: &SeriesCollection, frame: &Frame) -> Document {
    for (index, (series, color)) in with_colors(collection).into_iter().enumerate() {
        let y = frame.plot_y.end + 20.0 + index as f64 * 19.0;
        let mut swatch = Line::new()
            .set("x1", frame.plot_x.start + 12.0)
            .set("y1", y - 5.0)
            .set("x2", frame.plot_x.start + 44.0)
            .set("y2", y - 5.0)
            .set("stroke", color)
            .set("stroke-width", 3);
        if series.dashed {
            swatch = swatch.set("stroke-dasharray", "8 6");
        }
        document = document.add(swatch).add(
            TextElement::new(series.name.clone())
                .set("x", frame.plot_x.start + 52.0)
                .set("y", y)
                .set("font-size", 16),
        );
    }
    document
}

/// Map `a` from the source range onto the destination range.
fn map_float(a: f64, src: Range<f64>, dst: Range<f64>) -> f64 {
    (a - src.start) / (src.end - src.start) * (dst.end - dst.start) + dst.start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> SeriesCollection {
        SeriesCollection {
            dates: vec![
                NaiveDate::from_ymd_opt(2020, 4, 5).unwrap(),
                NaiveDate::from_ymd_opt(2020, 4, 4).unwrap(),
            ],
            series: vec![
                Series {
                    name: "total".to_string(),
                    values: vec![Some(4.0), Some(2.0)],
                    color: Some("blue"),
                    dashed: false,
                    markers_only: false,
                    annotate: true,
                },
                Series {
                    name: "total_healthy".to_string(),
                    values: vec![Some(1.0), None],
                    color: Some("red"),
                    dashed: false,
                    markers_only: true,
                    annotate: false,
                },
                Series {
                    name: "total (тренд 4 дня назад)".to_string(),
                    values: vec![Some(4.0), Some(2.0)],
                    color: Some("blue"),
                    dashed: true,
                    markers_only: false,
                    annotate: false,
                },
            ],
        }
    }

    #[test]
    fn test_document_contains_curves_and_labels() {
        let rendered = render_document(&collection()).to_string();

        assert!(rendered.contains("<polyline"));
        assert!(rendered.contains("<circle"));
        assert!(rendered.contains(TITLE));
        assert!(rendered.contains(Y_LABEL));
        // Power-of-two tick labels up to the data maximum
        assert!(rendered.lines().any(|line| line.trim() == "1"));
        assert!(rendered.lines().any(|line| line.trim() == "4"));
        // Rotated daily tick labels on the x axis
        assert!(rendered.lines().any(|line| line.trim() == "04-05"));
        // Legend entry for the markers-only series
        assert!(rendered.contains("total_healthy"));
        // Newest-value margin label for the annotated series
        assert!(rendered.contains("4 - total"));
        // Hover titles carry date and value
        assert!(rendered.contains("2020-04-05: 4 - total"));
    }

    #[test]
    fn test_trend_series_is_dashed() {
        let rendered = render_document(&collection()).to_string();
        assert!(rendered.contains("stroke-dasharray"));
    }

    #[test]
    fn test_markers_only_series_has_no_polyline() {
        let only_healthy = SeriesCollection {
            dates: collection().dates,
            series: vec![Series {
                name: "total_healthy".to_string(),
                values: vec![Some(2.0), Some(1.0)],
                color: Some("red"),
                dashed: false,
                markers_only: true,
                annotate: false,
            }],
        };
        let rendered = render_document(&only_healthy).to_string();
        assert!(!rendered.contains("<polyline"));
        // Plus markers are drawn as crossed lines in a group
        assert!(rendered.contains("<g"));
    }

    #[test]
    fn test_non_finite_values_stay_off_the_chart() {
        let mut collection = collection();
        collection.series[0].values[0] = Some(f64::INFINITY);
        let rendered = render_document(&collection).to_string();

        // The axis tops out at the largest finite value, and the infinite
        // point is simply not drawn
        assert!(rendered.lines().any(|line| line.trim() == "4"));
        assert!(!rendered.contains("inf"));
        assert!(!rendered.contains("NaN"));
    }

    #[test]
    fn test_html_page_embeds_svg() {
        let html = render_html(&collection());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("</svg>"));
        assert!(html.contains(TITLE));
    }
}
