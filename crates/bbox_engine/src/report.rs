//! Text renderings of a run's results

use crate::orchestrator::BboxReport;
use swf_model::{Rect, TWIPS_PER_UNIT};

/// `W x H :X :Y` in display units with two decimals
pub fn format_movie_size(rect: &Rect) -> String {
    format!(
        "{:.2} x {:.2} :{:.2} :{:.2}",
        f64::from(rect.width()) / TWIPS_PER_UNIT,
        f64::from(rect.height()) / TWIPS_PER_UNIT,
        f64::from(rect.x_min) / TWIPS_PER_UNIT,
        f64::from(rect.y_min) / TWIPS_PER_UNIT
    )
}

/// Brace-delimited per-frame listing of placed instances
///
/// ```text
/// {
///     {frame 0}
///     {name {x1 y1 x2 y2 x3 y3 x4 y4}}
/// }
/// ```
pub fn render_instances(report: &BboxReport) -> String {
    let mut out = String::new();
    let mut instances = report.instances.iter().peekable();
    for frame in 0..report.frames.max(1) {
        if frame > 0 {
            out.push_str("}\n");
        }
        out.push_str(&format!("{{\n\t{{frame {}}}\n", frame));
        while let Some(instance) = instances.next_if(|i| i.frame == frame) {
            let [p1, p2, p3, p4] = instance.corners;
            out.push_str(&format!(
                "\t{{{} {{{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}}}}}\n",
                instance.label, p1.0, p1.1, p2.0, p2.1, p3.0, p3.1, p4.0, p4.1
            ));
        }
    }
    out.push_str("}\n");
    out
}
