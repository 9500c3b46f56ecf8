use crate::error::SimError;
use crate::foraging::{ForagingThreeTable, ForagingTwoTable};
use crate::rendezvous::RendezvousTable;
use crate::constants::{GRID_EPSILON, MAX_THRESHOLD_KG};
use crate::stats::Histogram;

pub const RENDEZVOUS_TITLE: &str = "Patrol wins (%) by speed ratio";
pub const FORAGING_TWO_TITLE: &str = "Average kg of fish eaten by max weight of first fish";
pub const FORAGING_THREE_TITLE: &str = "Average kg of Fish Eaten";
pub const ALWAYS_EAT_TITLE: &str = "Average kg of fish eaten when always eating first fish";

pub trait ChartSink {
    // One symmetric error bar per value.
    fn bar(
        &mut self,
        title: &str,
        labels: &[f64],
        values: &[f64],
        errors: Option<&[f64]>,
    ) -> Result<(), SimError>;

    fn histogram(&mut self, title: &str, histogram: &Histogram) -> Result<(), SimError>;

    fn scatter3d(
        &mut self,
        title: &str,
        axis_labels: [&str; 3],
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<(), SimError>;
}

pub fn render_rendezvous<S: ChartSink + ?Sized>(table: &RendezvousTable, sink: &mut S) -> Result<(), SimError> {
    sink.bar(RENDEZVOUS_TITLE, &table.ratios(), &table.percentages(), None)
}

pub fn render_foraging_two<S: ChartSink + ?Sized>(table: &ForagingTwoTable, sink: &mut S) -> Result<(), SimError> {
    let stdevs = table.stdevs();
    sink.bar(
        FORAGING_TWO_TITLE,
        &table.thresholds(),
        &table.means(),
        Some(&stdevs),
    )?;
    for retained in &table.retained {
        sink.histogram(&retained_title(retained.max_kg), &retained.histogram)?;
    }
    Ok(())
}

fn retained_title(max_kg: f64) -> String {
    if max_kg >= MAX_THRESHOLD_KG - GRID_EPSILON {
        return ALWAYS_EAT_TITLE.to_string();
    }
    format!(
        "Average kg of fish eaten when only eating first fish if no more than {:.1} kg",
        max_kg
    )
}

pub fn render_foraging_three<S: ChartSink + ?Sized>(table: &ForagingThreeTable, sink: &mut S) -> Result<(), SimError> {
    let xs: Vec<f64> = table.rows.iter().map(|r| r.first_max_kg).collect();
    let ys: Vec<f64> = table.rows.iter().map(|r| r.second_max_kg).collect();
    let zs: Vec<f64> = table.rows.iter().map(|r| r.mean).collect();
    sink.scatter3d(
        FORAGING_THREE_TITLE,
        ["1st fish max kgs", "2nd fish max kgs", "Mean fish eaten"],
        &xs,
        &ys,
        &zs,
    )
}
