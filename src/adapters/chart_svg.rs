//! SVG chart of a single auction trade.

use crate::domain::error::AuctionPnlError;
use crate::domain::pnl::TradePnl;
use crate::domain::spread::SpreadPoint;
use crate::domain::window::{timestamp_at, WindowSpec};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use tracing::debug;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;

/// Auction results are published at 13:00.
const RESULT_HOUR: u32 = 13;

pub struct TradeChart<'a> {
    pub auction: NaiveDate,
    pub spec: WindowSpec,
    pub before: &'a [SpreadPoint],
    pub after: &'a [SpreadPoint],
    pub pnl: TradePnl,
}

impl TradeChart<'_> {
    pub fn title(&self) -> String {
        if self.spec.days_before == self.spec.days_after {
            format!(
                "Spread for {} Days Before and After Auction Date",
                fmt_days(self.spec.days_before)
            )
        } else {
            format!(
                "Spread for {} Days Before and {} Days After Auction Date",
                fmt_days(self.spec.days_before),
                fmt_days(self.spec.days_after)
            )
        }
    }
}

fn fmt_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{days:.0}")
    } else {
        format!("{days:.2}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Empty string when both legs are empty.
pub fn generate_trade_svg(chart: &TradeChart<'_>) -> String {
    let all: Vec<&SpreadPoint> = chart.before.iter().chain(chart.after.iter()).collect();
    let (Some(first), Some(last)) = (all.first(), all.last()) else {
        return String::new();
    };

    let result_time = timestamp_at(chart.auction, RESULT_HOUR, 0);
    let t0 = first.timestamp.min(result_time);
    let t1 = last.timestamp.max(result_time);
    let span = ((t1 - t0).num_seconds() as f64).max(1.0);

    let min_v = all.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max_v = all.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let range = if max_v > min_v { max_v - min_v } else { 1.0 };

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale = |t: NaiveDateTime| -> f64 {
        MARGIN_LEFT + ((t - t0).num_seconds() as f64 / span) * plot_width
    };
    let y_scale = |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_v) / range) * plot_height };

    let path_for = |points: &[SpreadPoint]| -> String {
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            d.push_str(&format!("{cmd} {:.1} {:.1}", x_scale(p.timestamp), y_scale(p.value)));
        }
        d
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-size=\"14\">{}</text>\n",
        CHART_WIDTH / 2.0,
        escape(&chart.title())
    ));

    // axes
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#666\">Date</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 8.0
    ));
    svg.push_str(&format!(
        "  <text x=\"15\" y=\"{y}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#666\" transform=\"rotate(-90 15 {y})\">Spread (bp)</text>\n",
        y = MARGIN_TOP + plot_height / 2.0
    ));

    for (value, y) in [
        (max_v, MARGIN_TOP + 5.0),
        ((max_v + min_v) / 2.0, MARGIN_TOP + plot_height / 2.0),
        (min_v, CHART_HEIGHT - MARGIN_BOTTOM - 5.0),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.3}</text>\n",
            MARGIN_LEFT - 5.0,
            y,
            value
        ));
    }
    for (t, anchor) in [(t0, "start"), (t1, "end")] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x_scale(t),
            CHART_HEIGHT - MARGIN_BOTTOM + 15.0,
            anchor,
            t.format("%Y-%m-%d %H:%M")
        ));
    }

    let x_result = x_scale(result_time);
    svg.push_str(&format!(
        "  <line x1=\"{x:.1}\" y1=\"{}\" x2=\"{x:.1}\" y2=\"{}\" stroke=\"#dc2626\" stroke-width=\"1\" stroke-dasharray=\"6 4\"/>\n",
        MARGIN_TOP,
        CHART_HEIGHT - MARGIN_BOTTOM,
        x = x_result
    ));

    if !chart.before.is_empty() {
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
            path_for(chart.before)
        ));
    }
    if !chart.after.is_empty() {
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"#16a34a\" stroke-width=\"2\"/>\n",
            path_for(chart.after)
        ));
    }

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"11\">PnL Before Auction: {:.2}</text>\n",
        MARGIN_LEFT + 10.0,
        MARGIN_TOP + 15.0,
        chart.pnl.pre_auction
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-size=\"11\">PnL After Auction: {:.2}</text>\n",
        MARGIN_LEFT + 10.0,
        MARGIN_TOP + 30.0,
        chart.pnl.post_auction
    ));
    svg.push_str("</svg>");
    svg
}

pub fn write_trade_chart(chart: &TradeChart<'_>, path: &Path) -> Result<(), AuctionPnlError> {
    let svg = generate_trade_svg(chart);
    fs::write(path, svg).map_err(|e| AuctionPnlError::DataFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), auction = %chart.auction, "wrote trade chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, h: u32, value: f64) -> SpreadPoint {
        SpreadPoint {
            timestamp: timestamp_at(NaiveDate::from_ymd_opt(2023, 2, d).unwrap(), h, 0),
            value,
        }
    }

    fn chart<'a>(before: &'a [SpreadPoint], after: &'a [SpreadPoint], spec: WindowSpec) -> TradeChart<'a> {
        TradeChart {
            auction: NaiveDate::from_ymd_opt(2023, 2, 8).unwrap(),
            spec,
            before,
            after,
            pnl: TradePnl {
                pre_auction: 500.0,
                post_auction: -125.5,
            },
        }
    }

    #[test]
    fn empty_legs_render_nothing() {
        let c = chart(&[], &[], WindowSpec::symmetric(2.0).unwrap());
        assert!(generate_trade_svg(&c).is_empty());
    }

    #[test]
    fn svg_has_title_axes_and_cutoff_line() {
        let before = [point(6, 10, -0.80), point(8, 10, -0.75)];
        let after = [point(8, 14, -0.76), point(9, 10, -0.79)];
        let c = chart(&before, &after, WindowSpec::symmetric(2.0).unwrap());
        let svg = generate_trade_svg(&c);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Spread for 2 Days Before and After Auction Date"));
        assert!(svg.contains(">Date<"));
        assert!(svg.contains("Spread (bp)"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("PnL Before Auction: 500.00"));
        assert!(svg.contains("PnL After Auction: -125.50"));
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn asymmetric_title() {
        let c = chart(&[], &[], WindowSpec::new(3.0, 1.5).unwrap());
        assert_eq!(
            c.title(),
            "Spread for 3 Days Before and 1.50 Days After Auction Date"
        );
    }

    #[test]
    fn write_trade_chart_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("trade.svg");
        let before = [point(7, 10, 1.0)];
        let c = chart(&before, &[], WindowSpec::symmetric(1.0).unwrap());
        write_trade_chart(&c, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"));
        assert_eq!(contents.matches("<path").count(), 1);
    }
}
