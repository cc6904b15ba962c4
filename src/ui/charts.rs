use std::ops::RangeInclusive;

use egui_plot::{BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::processing::series::{DistributionSeries, TimeSeries};
use crate::state::theme::color_for_index;

pub const CHART_HEIGHT: f32 = 260.0;

/// Category label for an integer axis position, empty between categories.
pub fn axis_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Plot coordinates for the slots that hold a finite reading. Gaps are
/// skipped so the line bridges them while the axis stays aligned.
pub fn present_points(points: &[Option<f64>]) -> Vec<[f64; 2]> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.filter(|v| v.is_finite()).map(|v| [i as f64, v]))
        .collect()
}

/// One box per device, coloured like that device's line.
pub fn show_box_plot(ui: &mut egui::Ui, distribution: &DistributionSeries, title: &str) {
    let labels = distribution.labels.clone();
    let summaries = distribution.summaries();

    Plot::new("eqa_box_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            axis_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            let boxes: Vec<BoxElem> = summaries
                .iter()
                .enumerate()
                .filter_map(|(i, summary)| {
                    let s = (*summary)?;
                    let color = color_for_index(i);
                    Some(
                        BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                            .name(&distribution.labels[i])
                            .box_width(0.5)
                            .fill(color.gamma_multiply(0.35))
                            .stroke(egui::Stroke::new(1.5, color)),
                    )
                })
                .collect();
            plot_ui.box_plot(BoxPlot::new(boxes).name(title));
        });
}

/// Readings over the date axis, one line per device.
pub fn show_line_chart(ui: &mut egui::Ui, series: &TimeSeries) {
    let labels = series.labels.clone();

    Plot::new("eqa_line_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            axis_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for (i, device) in series.series.iter().enumerate() {
                let color = color_for_index(i);
                let points = present_points(&device.points);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(&device.device_id)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(&device.device_id)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
