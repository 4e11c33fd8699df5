use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::styles::{ChartStyle, ChartTheme, ColorScale};
use crate::analysis::Report;
use crate::config::{Margin, ReportConfig};
use crate::error::{SalesError, SalesResult};
use crate::types::{MonthlySeries, ReportOutput};
use crate::utils::format::{format_compact, format_int, format_percent, FormatOptions};

type PlotError = Box<dyn Error + Send + Sync>;
type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// How values are printed on axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Currency,
    Percent,
    Count,
}

impl ValueKind {
    fn axis_label(self, value: f64, format: &FormatOptions) -> String {
        match self {
            ValueKind::Currency => format.currency(value),
            ValueKind::Percent => format_percent(value, 0),
            ValueKind::Count => format_compact(value),
        }
    }

    fn value_label(self, value: f64, format: &FormatOptions) -> String {
        match self {
            ValueKind::Currency => format.currency_vnd(value),
            ValueKind::Percent => format.percent(value),
            ValueKind::Count => format_int(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One bar: its axis label, value, and the category that picks its color.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub category: String,
    /// Legend text of the category
    pub legend: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    pub orientation: Orientation,
    pub kind: ValueKind,
    pub show_legend: bool,
    /// Reserve the fixed group-code colors
    pub group_colors: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub series: Vec<MonthlySeries>,
    pub kind: ValueKind,
}

/// Drawable form of a report output.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Bars(BarChart),
    Lines(LineChart),
    /// Small multiples, one titled chart per panel
    Panels(Vec<(String, ChartData)>),
}

fn bar(
    label: impl Into<String>,
    value: f64,
    category: impl Into<String>,
    legend: impl Into<String>,
) -> Bar {
    Bar {
        label: label.into(),
        value,
        category: category.into(),
        legend: legend.into(),
    }
}

fn single_color_bars(bars: Vec<Bar>, kind: ValueKind) -> ChartData {
    ChartData::Bars(BarChart {
        bars,
        orientation: Orientation::Vertical,
        kind,
        show_legend: false,
        group_colors: false,
    })
}

/// Map a report output onto the chart that displays it.
pub fn chart_data(report: Report, output: &ReportOutput) -> ChartData {
    match output {
        ReportOutput::Revenue(records) if report == Report::RevenueByMonth => single_color_bars(
            records
                .iter()
                .map(|r| bar(r.label.clone(), r.revenue, r.label.clone(), r.label.clone()))
                .collect(),
            ValueKind::Currency,
        ),
        ReportOutput::Revenue(records) => ChartData::Bars(BarChart {
            bars: records
                .iter()
                .map(|r| {
                    let code = r.group_code.clone().unwrap_or_default();
                    let legend = format!("[{}] {}", code, r.group_name.as_deref().unwrap_or(&code));
                    bar(r.label.clone(), r.revenue, code, legend)
                })
                .collect(),
            orientation: Orientation::Horizontal,
            kind: ValueKind::Currency,
            show_legend: true,
            group_colors: true,
        }),
        ReportOutput::Calendar(records) => single_color_bars(
            records
                .iter()
                .map(|r| bar(r.label.clone(), r.average_revenue, r.label.clone(), r.label.clone()))
                .collect(),
            ValueKind::Currency,
        ),
        ReportOutput::Probability(records) => ChartData::Bars(BarChart {
            bars: records
                .iter()
                .map(|r| {
                    let code = r.group_code.clone().unwrap_or_default();
                    bar(r.label.clone(), r.probability, code, r.label.clone())
                })
                .collect(),
            orientation: Orientation::Horizontal,
            kind: ValueKind::Percent,
            show_legend: true,
            group_colors: true,
        }),
        ReportOutput::MonthlyProbability(series) => ChartData::Lines(LineChart {
            series: series.clone(),
            kind: ValueKind::Percent,
        }),
        ReportOutput::GroupBreakdown(groups) => ChartData::Panels(
            groups
                .iter()
                .map(|g| {
                    let bars = g
                        .items
                        .iter()
                        .map(|r| {
                            bar(r.label.clone(), r.probability, r.label.clone(), r.label.clone())
                        })
                        .collect();
                    let chart = ChartData::Bars(BarChart {
                        bars,
                        orientation: Orientation::Horizontal,
                        kind: ValueKind::Percent,
                        show_legend: false,
                        group_colors: false,
                    });
                    (g.group.clone(), chart)
                })
                .collect(),
        ),
        ReportOutput::GroupMonthlyProbability(groups) => ChartData::Panels(
            groups
                .iter()
                .map(|g| {
                    let chart = ChartData::Lines(LineChart {
                        series: g.series.clone(),
                        kind: ValueKind::Percent,
                    });
                    (g.group.clone(), chart)
                })
                .collect(),
        ),
        ReportOutput::Frequency(buckets) => single_color_bars(
            buckets
                .iter()
                .map(|b| bar(b.value.to_string(), b.entities as f64, "", ""))
                .collect(),
            ValueKind::Count,
        ),
        ReportOutput::Histogram(bins) => single_color_bars(
            bins.iter()
                .map(|b| bar(b.label.clone(), b.count as f64, "", ""))
                .collect(),
            ValueKind::Count,
        ),
    }
}

/// Where a rendered chart ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    File(PathBuf),
    Memory,
}

/// Owns the output target of one render call.
///
/// Created explicitly, drawn into with [`RenderContext::render`], and released
/// with [`RenderContext::finish`]. Dropping an unfinished context discards the
/// chart without touching the target.
pub struct RenderContext {
    target: RenderTarget,
    size: (u32, u32),
    margin: Margin,
    theme: ChartTheme,
    style: ChartStyle,
    format: FormatOptions,
    svg: Option<String>,
    finished: bool,
}

impl RenderContext {
    pub fn create(target: RenderTarget, config: &ReportConfig) -> Self {
        debug!(
            render_target = ?target,
            width = config.width,
            height = config.height,
            "render context created"
        );
        Self {
            target,
            size: (config.width, config.height),
            margin: config.margin,
            theme: ChartTheme::default(),
            style: ChartStyle::default(),
            format: config.format_options.clone(),
            svg: None,
            finished: false,
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Draw a report into the context, replacing anything drawn before.
    ///
    /// # Errors
    ///
    /// Returns `SalesError::Render` when plotting fails.
    pub fn render(&mut self, report: Report, output: &ReportOutput) -> SalesResult<()> {
        let data = chart_data(report, output);
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, self.size).into_drawing_area();
            self.draw(&root, report.title(), &data)
                .map_err(|e| SalesError::Render(e.to_string()))?;
            root.present().map_err(|e| SalesError::Render(e.to_string()))?;
        }
        self.svg = Some(buffer);
        Ok(())
    }

    fn draw(&self, root: &Area, title: &str, data: &ChartData) -> Result<(), PlotError> {
        root.fill(&self.theme.background_color)?;
        let area = root.margin(
            self.margin.top,
            self.margin.bottom,
            self.margin.left,
            self.margin.right,
        );
        draw_chart(&area, title, data, &self.theme, &self.style, &self.format)
    }

    /// Write the rendered chart to its target and release the context.
    ///
    /// # Errors
    ///
    /// Fails when nothing was rendered or the target file cannot be written.
    pub fn finish(mut self) -> SalesResult<String> {
        self.finished = true;
        let svg = self
            .svg
            .take()
            .ok_or_else(|| SalesError::Render("nothing was rendered".to_string()))?;

        if let RenderTarget::File(path) = &self.target {
            std::fs::write(path, &svg).map_err(|source| SalesError::Io {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), bytes = svg.len(), "chart written");
        }
        Ok(svg)
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if !self.finished && self.svg.is_some() {
            warn!(
                render_target = ?self.target,
                "render context dropped before finish, chart discarded"
            );
        }
    }
}

fn draw_chart(
    area: &Area,
    title: &str,
    data: &ChartData,
    theme: &ChartTheme,
    style: &ChartStyle,
    format: &FormatOptions,
) -> Result<(), PlotError> {
    match data {
        ChartData::Bars(chart) => draw_bar_chart(area, title, chart, theme, style, format),
        ChartData::Lines(chart) => draw_line_chart(area, title, chart, theme, style, format),
        ChartData::Panels(panels) => {
            let caption_font = ("sans-serif", style.font_size + 5)
                .into_font()
                .color(&theme.text_color);
            let area = area.titled(title, caption_font)?;
            let cols = panels.len().clamp(1, 2);
            let rows = panels.len().div_ceil(cols).max(1);
            let cells = area.split_evenly((rows, cols));
            for (cell, (panel_title, panel)) in cells.iter().zip(panels.iter()) {
                draw_chart(cell, panel_title, panel, theme, style, format)?;
            }
            Ok(())
        }
    }
}

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.15
    } else {
        1.0
    }
}

/// Categories in first-seen order with their legend text.
fn categories(bars: &[Bar]) -> Vec<(&str, &str)> {
    let mut seen: Vec<(&str, &str)> = Vec::new();
    for bar in bars {
        if !seen.iter().any(|(c, _)| *c == bar.category) {
            seen.push((bar.category.as_str(), bar.legend.as_str()));
        }
    }
    seen
}

fn draw_bar_chart(
    area: &Area,
    title: &str,
    chart: &BarChart,
    theme: &ChartTheme,
    style: &ChartStyle,
    format: &FormatOptions,
) -> Result<(), PlotError> {
    let count = chart.bars.len().max(1) as i32;
    let max = value_range(chart.bars.iter().map(|b| b.value));
    let kind = chart.kind;
    let font = ("sans-serif", style.font_size).into_font().color(&theme.text_color);
    let caption_font = ("sans-serif", style.font_size + 5).into_font().color(&theme.text_color);
    let mut colors = if chart.group_colors {
        ColorScale::new()
    } else {
        ColorScale::unreserved()
    };

    let value_formatter = |v: &f64| kind.axis_label(*v, format);

    match chart.orientation {
        Orientation::Horizontal => {
            // first record on top
            let labels: Vec<String> = chart.bars.iter().rev().map(|b| b.label.clone()).collect();
            let slot = |i: usize| count - 1 - i as i32;
            let label_formatter = |v: &SegmentValue<i32>| segment_label(&labels, v);

            let mut ctx = ChartBuilder::on(area)
                .caption(title, caption_font)
                .margin(style.margin)
                .x_label_area_size(style.label_area_size)
                .y_label_area_size(style.category_label_area_size)
                .build_cartesian_2d(0f64..max, (0..count).into_segmented())?;

            ctx.configure_mesh()
                .disable_y_mesh()
                .light_line_style(TRANSPARENT)
                .bold_line_style(theme.grid_color)
                .axis_style(theme.axis_color)
                .label_style(font.clone())
                .y_labels(count as usize)
                .x_labels(8)
                .y_label_formatter(&label_formatter)
                .x_label_formatter(&value_formatter)
                .draw()?;

            for (category, legend) in categories(&chart.bars) {
                let color = colors.color(category);
                let series = ctx.draw_series(
                    chart
                        .bars
                        .iter()
                        .enumerate()
                        .filter(|(_, b)| b.category == category)
                        .map(|(i, b)| {
                            let y = slot(i);
                            Rectangle::new(
                                [
                                    (0.0, SegmentValue::Exact(y)),
                                    (b.value, SegmentValue::Exact(y + 1)),
                                ],
                                color.filled(),
                            )
                        }),
                )?;
                if chart.show_legend {
                    series
                        .label(legend)
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                        });
                }
            }

            ctx.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
                Text::new(
                    format!(" {}", kind.value_label(b.value, format)),
                    (b.value, SegmentValue::CenterOf(slot(i))),
                    font.clone(),
                )
            }))?;

            if chart.show_legend {
                ctx.configure_series_labels()
                    .position(SeriesLabelPosition::LowerRight)
                    .background_style(theme.background_color)
                    .border_style(theme.axis_color)
                    .label_font(font.clone())
                    .draw()?;
            }
        }
        Orientation::Vertical => {
            let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
            let label_formatter = |v: &SegmentValue<i32>| segment_label(&labels, v);

            let mut ctx = ChartBuilder::on(area)
                .caption(title, caption_font)
                .margin(style.margin)
                .x_label_area_size(style.label_area_size)
                .y_label_area_size(style.label_area_size + 40)
                .build_cartesian_2d((0..count).into_segmented(), 0f64..max)?;

            ctx.configure_mesh()
                .disable_x_mesh()
                .light_line_style(TRANSPARENT)
                .bold_line_style(theme.grid_color)
                .axis_style(theme.axis_color)
                .label_style(font.clone())
                .x_labels(count as usize)
                .y_labels(8)
                .x_label_formatter(&label_formatter)
                .y_label_formatter(&value_formatter)
                .draw()?;

            for (category, _) in categories(&chart.bars) {
                let color = colors.color(category);
                ctx.draw_series(
                    chart
                        .bars
                        .iter()
                        .enumerate()
                        .filter(|(_, b)| b.category == category)
                        .map(|(i, b)| {
                            let x = i as i32;
                            Rectangle::new(
                                [
                                    (SegmentValue::Exact(x), 0.0),
                                    (SegmentValue::Exact(x + 1), b.value),
                                ],
                                color.filled(),
                            )
                        }),
                )?;
            }

            ctx.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
                Text::new(
                    kind.value_label(b.value, format),
                    (SegmentValue::CenterOf(i as i32), b.value),
                    font.clone(),
                )
            }))?;
        }
    }

    Ok(())
}

fn draw_line_chart(
    area: &Area,
    title: &str,
    chart: &LineChart,
    theme: &ChartTheme,
    style: &ChartStyle,
    format: &FormatOptions,
) -> Result<(), PlotError> {
    let kind = chart.kind;
    let max = value_range(chart.series.iter().flat_map(|s| s.points.iter().map(|p| p.value)));
    let font = ("sans-serif", style.font_size).into_font().color(&theme.text_color);
    let mut colors = ColorScale::unreserved();

    let mut ctx = ChartBuilder::on(area)
        .caption(title, ("sans-serif", style.font_size + 5).into_font().color(&theme.text_color))
        .margin(style.margin)
        .set_all_label_area_size(style.label_area_size)
        .build_cartesian_2d(1f64..12f64, 0f64..max)?;

    ctx.configure_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(theme.grid_color)
        .axis_style(theme.axis_color)
        .label_style(font.clone())
        .x_labels(12)
        .x_label_formatter(&|x| format!("T{:.0}", x))
        .y_label_formatter(&|y| kind.axis_label(*y, format))
        .draw()?;

    for series in &chart.series {
        let color = colors.color(&series.category);
        ctx.draw_series(LineSeries::new(
            series.points.iter().map(|p| (p.month as f64, p.value)),
            color.stroke_width(style.line_width),
        ))?
        .label(series.category.clone())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        ctx.draw_series(
            series
                .points
                .iter()
                .map(|p| Circle::new((p.month as f64, p.value), 3, color.filled())),
        )?;
    }

    if !chart.series.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(theme.background_color)
            .border_style(theme.axis_color)
            .label_font(font)
            .draw()?;
    }

    Ok(())
}
