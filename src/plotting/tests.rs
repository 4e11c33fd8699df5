use super::*;
use crate::analysis::{run_report, Report};
use crate::analysis::tests::row;
use crate::config::ReportConfig;
use crate::types::{ReportOutput, TransactionRow};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn setup_rows() -> Vec<TransactionRow> {
    vec![
        row("O1", "BOT01", "BOT", 120_000.0, 2.0, "2024-01-05 09:10:00"),
        row("O1", "THO01", "THO", 80_000.0, 1.0, "2024-01-05 09:10:00"),
        row("O2", "TTC01", "TTC", 45_000.0, 1.0, "2024-02-11 14:30:00"),
        row("O3", "BOT02", "BOT", 300_000.0, 3.0, "2024-03-20 20:45:00"),
        row("O4", "SET01", "SET", 15_000.0, 1.0, "2024-03-21 11:00:00"),
    ]
}

fn render(report: Report, output: &ReportOutput) -> String {
    let mut ctx = RenderContext::create(RenderTarget::Memory, &ReportConfig::default());
    ctx.render(report, output).unwrap();
    ctx.finish().unwrap()
}

#[test]
fn test_render_every_report_to_memory() {
    let rows = setup_rows();
    let config = ReportConfig::default();

    for report in Report::ALL {
        let output = run_report(report, &rows, &config).unwrap();
        let svg = render(report, &output);
        assert!(svg.contains("<svg"), "{:?} did not produce an svg", report);
        assert!(svg.contains(report.title()), "{:?} is missing its caption", report);
    }
}

#[test]
fn test_render_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("chart.svg");
    let rows = setup_rows();
    let output = run_report(Report::RevenueByGroup, &rows, &ReportConfig::default()).unwrap();

    let mut ctx =
        RenderContext::create(RenderTarget::File(path.clone()), &ReportConfig::default());
    assert_eq!(ctx.target(), &RenderTarget::File(path.clone()));
    ctx.render(Report::RevenueByGroup, &output).unwrap();
    let svg = ctx.finish().unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, svg);
    assert!(written.contains("[BOT] Group BOT"));
}

#[test]
fn test_panel_reports_keep_caption() {
    let rows = setup_rows();
    let config = ReportConfig::default();

    for report in [
        Report::ItemProbabilityByGroup,
        Report::ItemProbabilityByGroupMonth,
    ] {
        let output = run_report(report, &rows, &config).unwrap();
        assert!(matches!(chart_data(report, &output), ChartData::Panels(_)));

        let svg = render(report, &output);
        assert_eq!(svg.matches(report.title()).count(), 1, "{:?}", report);
        assert!(svg.contains("[BOT] Group BOT"), "{:?} lost its panel titles", report);
    }
}

#[test]
fn test_finish_without_render_fails() {
    let ctx = RenderContext::create(RenderTarget::Memory, &ReportConfig::default());
    assert!(ctx.finish().is_err());
}

#[test]
fn test_dropped_context_leaves_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dropped.svg");
    let rows = setup_rows();
    let output = run_report(Report::HourAverage, &rows, &ReportConfig::default()).unwrap();

    {
        let mut ctx =
            RenderContext::create(RenderTarget::File(path.clone()), &ReportConfig::default());
        ctx.render(Report::HourAverage, &output).unwrap();
    }
    assert!(!path.exists());
}

#[test]
fn test_chart_data_shapes() {
    let rows = setup_rows();
    let config = ReportConfig::default();

    let by_item = run_report(Report::RevenueByItem, &rows, &config).unwrap();
    match chart_data(Report::RevenueByItem, &by_item) {
        ChartData::Bars(chart) => {
            assert_eq!(chart.orientation, Orientation::Horizontal);
            assert_eq!(chart.kind, ValueKind::Currency);
            assert_eq!(chart.bars[0].category, "BOT");
            assert_eq!(chart.bars[0].legend, "[BOT] Group BOT");
        }
        other => panic!("unexpected chart {:?}", other),
    }

    let by_month = run_report(Report::RevenueByMonth, &rows, &config).unwrap();
    match chart_data(Report::RevenueByMonth, &by_month) {
        ChartData::Bars(chart) => {
            assert_eq!(chart.orientation, Orientation::Vertical);
            assert!(!chart.show_legend);
            assert_eq!(chart.bars.len(), 3);
        }
        other => panic!("unexpected chart {:?}", other),
    }

    let breakdown = run_report(Report::ItemProbabilityByGroup, &rows, &config).unwrap();
    match chart_data(Report::ItemProbabilityByGroup, &breakdown) {
        ChartData::Panels(panels) => assert_eq!(panels.len(), 4),
        other => panic!("unexpected chart {:?}", other),
    }

    let lines = run_report(Report::GroupProbabilityByMonth, &rows, &config).unwrap();
    assert!(matches!(
        chart_data(Report::GroupProbabilityByMonth, &lines),
        ChartData::Lines(LineChart { kind: ValueKind::Percent, .. })
    ));
}

#[test]
fn test_empty_output_still_renders() {
    let svg = render(Report::SpendHistogram, &ReportOutput::Histogram(Vec::new()));
    assert!(svg.contains("<svg"));
}
