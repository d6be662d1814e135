//! Optional AI digest of a run's updates and triggered signals.

pub mod gemini;

pub use gemini::{GeminiSummarizer, DEFAULT_MODELS, GEMINI_BASE_URL};

pub const NO_UPDATES: &str = "None";

/// Build the digest prompt from pre-rendered update and signal lines.
pub fn build_prompt(updated_indicators: &[String], triggered_signals: &[String]) -> String {
    let updates = join_or_none(updated_indicators);
    let signals = join_or_none(triggered_signals);

    format!(
        r#"You are a quantitative market assistant summarising semiconductor and macro indicator changes for a financial engineer.

Rules:
1. Be blunt. No pleasantries, state the data.
2. Only comment on indicators that updated or signals that crossed a threshold.
3. Spot memory prices and custom composite signals come first.
4. The result is a push notification: short bullet points, direction emojis (📈, 📉, ⚠️), under 150 words.

Updated indicators (growth-rate difference vs. trend in parentheses):
{updates}

Custom signal status:
{signals}

Task:
If nothing significant changed, reply only with "📉 No significant alpha signal updates."
Otherwise structure the message as:
HEADLINE: 3-4 words naming the regime
ALPHA: spot price updates and signal breaches
FLOW: notable shipment, revenue or capex changes
MACRO: only if volatility or yields moved more than 5%
"#
    )
}

fn join_or_none(lines: &[String]) -> String {
    if lines.is_empty() {
        NO_UPDATES.to_string()
    } else {
        lines.join("\n")
    }
}
