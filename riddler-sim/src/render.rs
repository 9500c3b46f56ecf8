use std::io::Write;

use riddler_core::{ChartSink, Histogram, SimError};
use serde::Serialize;

const BAR_WIDTH: usize = 40;
const MISSING_CELL: &str = "-";

pub struct TextChart<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextChart<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: BAR_WIDTH,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn scaled(&self, value: f64, max: f64) -> usize {
        if !value.is_finite() || max <= 0.0 || value <= 0.0 {
            return 0;
        }
        ((value / max) * self.width as f64).round() as usize
    }
}

impl<W: Write> ChartSink for TextChart<W> {
    fn bar(
        &mut self,
        title: &str,
        labels: &[f64],
        values: &[f64],
        errors: Option<&[f64]>,
    ) -> Result<(), SimError> {
        writeln!(self.out, "\n{}", title)?;
        let max = values.iter().cloned().fold(0.0, f64::max);
        for (i, (label, value)) in labels.iter().zip(values).enumerate() {
            let bar = "#".repeat(self.scaled(*value, max));
            match errors.and_then(|e| e.get(i)) {
                Some(err) => writeln!(
                    self.out,
                    "{:>6.2} | {:<w$} {:.3} ± {:.3}",
                    label,
                    bar,
                    value,
                    err,
                    w = self.width
                )?,
                None => writeln!(
                    self.out,
                    "{:>6.2} | {:<w$} {:.3}",
                    label,
                    bar,
                    value,
                    w = self.width
                )?,
            }
        }
        Ok(())
    }

    fn histogram(&mut self, title: &str, histogram: &Histogram) -> Result<(), SimError> {
        writeln!(self.out, "\n{}", title)?;
        let max = histogram.counts.iter().copied().max().unwrap_or(0) as f64;
        let w = histogram.bin_width();
        for (edge, count) in histogram.edges().iter().zip(&histogram.counts) {
            let bar = "#".repeat(self.scaled(*count as f64, max));
            writeln!(
                self.out,
                "[{:.2}, {:.2}) | {:<w$} {}",
                edge,
                edge + w,
                bar,
                count,
                w = self.width
            )?;
        }
        Ok(())
    }

    fn scatter3d(
        &mut self,
        title: &str,
        axis_labels: [&str; 3],
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<(), SimError> {
        writeln!(self.out, "\n{}", title)?;
        writeln!(
            self.out,
            "rows: {}, columns: {}, cells: {}",
            axis_labels[0], axis_labels[1], axis_labels[2]
        )?;
        let cols = distinct_sorted(ys);
        let rows = distinct_sorted(xs);
        let mut header = format!("{:>6} |", "");
        for c in &cols {
            header.push_str(&format!(" {:>5.2}", c));
        }
        writeln!(self.out, "{}", header)?;
        for r in &rows {
            let mut line = format!("{:>6.2} |", r);
            for c in &cols {
                let cell = xs
                    .iter()
                    .zip(ys)
                    .zip(zs)
                    .find(|((x, y), _)| *x == r && *y == c)
                    .map(|(_, z)| format!(" {:>5.2}", z))
                    .unwrap_or_else(|| format!(" {:>5}", MISSING_CELL));
                line.push_str(&cell);
            }
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }
}

fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out.dedup();
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartPayload {
    Bar {
        title: String,
        labels: Vec<f64>,
        values: Vec<f64>,
        errors: Option<Vec<f64>>,
    },
    Histogram {
        title: String,
        edges: Vec<f64>,
        #[serde(rename = "binWidth")]
        bin_width: f64,
        counts: Vec<u64>,
    },
    Scatter3d {
        title: String,
        #[serde(rename = "axisLabels")]
        axis_labels: [String; 3],
        xs: Vec<f64>,
        ys: Vec<f64>,
        zs: Vec<f64>,
    },
}

// Payloads for `--json` output.
#[derive(Debug, Default)]
pub struct JsonChart {
    pub charts: Vec<ChartPayload>,
}

impl ChartSink for JsonChart {
    fn bar(
        &mut self,
        title: &str,
        labels: &[f64],
        values: &[f64],
        errors: Option<&[f64]>,
    ) -> Result<(), SimError> {
        self.charts.push(ChartPayload::Bar {
            title: title.to_string(),
            labels: labels.to_vec(),
            values: values.to_vec(),
            errors: errors.map(|e| e.to_vec()),
        });
        Ok(())
    }

    fn histogram(&mut self, title: &str, histogram: &Histogram) -> Result<(), SimError> {
        self.charts.push(ChartPayload::Histogram {
            title: title.to_string(),
            edges: histogram.edges(),
            bin_width: histogram.bin_width(),
            counts: histogram.counts.clone(),
        });
        Ok(())
    }

    fn scatter3d(
        &mut self,
        title: &str,
        axis_labels: [&str; 3],
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<(), SimError> {
        self.charts.push(ChartPayload::Scatter3d {
            title: title.to_string(),
            axis_labels: axis_labels.map(str::to_string),
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.to_vec(),
        });
        Ok(())
    }
}
