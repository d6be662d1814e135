//! Human-readable alert rendering

use crate::models::{SignalResult, Threshold};

/// Render `(title, body)` for a triggered result.
pub fn format_alert(result: &SignalResult) -> (String, String) {
    if result.dependencies.is_empty() {
        format_indicator_alert(result)
    } else {
        format_composite_alert(result)
    }
}

fn format_indicator_alert(result: &SignalResult) -> (String, String) {
    let direction = if result.statistic > 0.0 {
        "increased"
    } else {
        "decreased"
    };
    let title = format!("TrendForce Alert: {}", result.name);
    let body = format!(
        "{} {} by {:.1}% (threshold: {})\n\nNew value: {:.3}{}\nDate: {}",
        result.name,
        direction,
        result.statistic.abs(),
        result.threshold,
        result.value,
        unit_suffix(&result.unit),
        result.date.format("%Y-%m-%d"),
    );
    (title, body)
}

fn format_composite_alert(result: &SignalResult) -> (String, String) {
    let title = format!("TrendForce Signal: {}", result.name);

    let headline = match result.threshold {
        Threshold::Band { min, max } => {
            let side = if result.statistic < min { "below" } else { "above" };
            format!(
                "{} ratio {:.3} is {} band [{:.3}, {:.3}]",
                result.name, result.statistic, side, min, max
            )
        }
        Threshold::Scalar(_) => format!(
            "{} ({}) at {:+.1} pp (threshold: {})",
            result.name, result.kind, result.statistic, result.threshold
        ),
    };

    let mut body = headline;
    body.push_str("\n\nInputs:");
    for dependency in &result.dependencies {
        body.push_str(&format!(
            "\n- {} ({}): {:.3}",
            dependency.name, dependency.indicator_id, dependency.value
        ));
        if let Some(statistic) = dependency.statistic {
            body.push_str(&format!(" ({:+.1}%)", statistic));
        }
    }
    body.push_str(&format!("\nDate: {}", result.date.format("%Y-%m-%d")));

    (title, body)
}

/// One-line summary of an updated indicator for the run digest,
/// e.g. `ID 6105 (DRAM Spot): 1.234 USD (+5.2%)`.
pub fn format_update_line(result: &SignalResult) -> String {
    let id = result
        .indicator_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| result.name.clone());
    format!(
        "ID {} ({}): {:.3}{} ({:+.1}%)",
        id,
        result.name,
        result.value,
        unit_suffix(&result.unit),
        result.statistic
    )
}

/// One-line triggered-signal summary for the run digest.
pub fn format_signal_line(result: &SignalResult) -> String {
    let inputs: Vec<String> = result
        .dependencies
        .iter()
        .map(|d| match d.statistic {
            Some(statistic) => format!("{} {:+.1}%", d.name, statistic),
            None => format!("{} {:.3}", d.name, d.value),
        })
        .collect();
    if inputs.is_empty() {
        format!("⚠️ {}: TRIGGERED ({:+.1}%)", result.name, result.statistic)
    } else {
        format!("⚠️ {}: TRIGGERED ({})", result.name, inputs.join(", "))
    }
}

fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    }
}
