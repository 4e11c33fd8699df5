//! SVG charts for report outputs.

mod chart;
pub mod styles;

#[cfg(test)]
mod tests;

pub use chart::{
    chart_data, Bar, BarChart, ChartData, LineChart, Orientation, RenderContext, RenderTarget,
    ValueKind,
};
pub use styles::{ChartStyle, ChartTheme, ColorScale};
