//! Report export: JSON and CSV.

use anyhow::{Context, Result};
use holdwise_core::domain::Action;
use holdwise_core::AnalysisReport;

/// Serialize the full report to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Export the final recommendations as CSV, one row per ticker.
///
/// Columns: ticker, action, shares, target_price, confidence, risk,
/// stop_loss, take_profit, max_position_size, reasons
pub fn export_recommendations_csv(report: &AnalysisReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "action",
        "shares",
        "target_price",
        "confidence",
        "risk",
        "stop_loss",
        "take_profit",
        "max_position_size",
        "reasons",
    ])?;

    for r in &report.recommendations {
        wtr.write_record([
            r.ticker.clone(),
            r.action.label().to_string(),
            format!("{:.4}", r.suggested_shares),
            format!("{:.4}", r.target_price),
            format!("{:.1}", r.confidence),
            r.risk_assessment.label().to_string(),
            optional(r.stop_loss_price),
            optional(r.take_profit_price),
            optional(r.max_position_size),
            r.reasons.join("; "),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

/// Human-readable summary for the terminal.
pub fn render_text(report: &AnalysisReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    out.push_str("=== Portfolio ===\n");
    out.push_str(&format!("Total value:    {:.2}\n", m.total_value));
    out.push_str(&format!("Invested:       {:.2}\n", m.invested_value));
    out.push_str(&format!("Cash:           {:.2} ({:.1}%)\n", m.cash, m.cash_fraction * 100.0));
    out.push_str(&format!("Unrealized P&L: {:.2}\n", m.total_pnl));
    out.push_str(&format!("Concentration:  {:.3}\n", m.concentration));
    out.push_str(&format!("Adj. Sharpe:    {:.3}\n", m.adjusted_sharpe));
    out.push_str(&format!(
        "Win/Loss/Flat:  {}/{}/{}\n",
        m.winners, m.losers, m.breakeven
    ));
    out.push_str(&format!("Avg days held:  {:.1}\n", m.average_days_held));

    out.push_str(&format!(
        "\n--- Risk: {} (score {}) ---\n",
        report.risk.level, report.risk.score
    ));
    for (factor, action) in report.risk.factors.iter().zip(&report.risk.suggested_actions) {
        out.push_str(&format!("  - {factor}\n    -> {action}\n"));
    }

    out.push_str(&format!(
        "\n--- Recommendations ({} of {} generated) ---\n",
        report.recommendations.len(),
        report.generated
    ));
    if report.recommendations.is_empty() {
        out.push_str("  (none)\n");
    }
    for r in &report.recommendations {
        out.push_str(&format!(
            "{:<8} {:<20} {:>10.2} @ {:>10.2}  conf {:>5.1}  risk {}\n",
            r.ticker,
            describe(&r.action),
            r.suggested_shares,
            r.target_price,
            r.confidence,
            r.risk_assessment
        ));
        for reason in &r.reasons {
            out.push_str(&format!("         · {reason}\n"));
        }
    }

    out.push_str(&format!("\nFingerprint: {}\n", report.fingerprint));
    out
}

fn describe(action: &Action) -> String {
    match action {
        Action::SellProfitTaking { fraction, .. } => {
            format!("{} {:.0}%", action.label(), fraction * 100.0)
        }
        _ => action.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdwise_core::domain::{PortfolioSnapshot, Position};
    use holdwise_core::{analyze, AnalysisInput, EngineConfig};

    fn report() -> AnalysisReport {
        let snapshot = PortfolioSnapshot::new(vec![Position::new("FRESH", 40.0, 100.0, 94.0, 1)], 20_000.0);
        analyze(&AnalysisInput::new(snapshot), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_recommendation() {
        let report = report();
        let csv = export_recommendations_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert!(lines[0].starts_with("ticker,action,shares"));
        assert_eq!(lines.len(), report.recommendations.len() + 1);
        assert!(lines[1].starts_with("FRESH,sell-stop-loss"));
    }

    #[test]
    fn json_round_trips() {
        let report = report();
        let json = export_json(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fingerprint, report.fingerprint);
    }

    #[test]
    fn text_lists_recommendations() {
        let text = render_text(&report());
        assert!(text.contains("FRESH"));
        assert!(text.contains("Fingerprint"));
    }
}
