//! Report aggregation: one structure combining every analyzer's output
//! with a single headline leakage estimate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::affinity::AffinityPair;
use crate::bundle::BundleQuote;
use crate::churn::ChurnRisk;
use crate::cycle::DueCustomer;
use crate::domain::finding::{FindingKind, LeakageFinding, Severity};

/// An affinity pair with its bundle pricing; pricing is absent when either
/// product lacks the price data to bundle it honestly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleOpportunity {
    pub pair: AffinityPair,
    pub pricing: Option<BundleQuote>,
}

/// Point-in-time analytics report, JSON-ready for a rendering layer.
///
/// `estimated_leakage` is an order-of-magnitude prioritization figure, not
/// an audited number; callers must not present it as exact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub due_customers: Vec<DueCustomer>,
    pub churn_risks: Vec<ChurnRisk>,
    pub bundles: Vec<BundleOpportunity>,
    pub findings: Vec<LeakageFinding>,
    pub estimated_leakage: Decimal,
    pub finding_count: usize,
}

/// Assemble the final report. Churn risks are folded into the findings
/// list as churn-risk findings so the headline figure covers all four
/// leakage categories.
pub fn aggregate(
    generated_at: DateTime<Utc>,
    due_customers: Vec<DueCustomer>,
    churn_risks: Vec<ChurnRisk>,
    bundles: Vec<BundleOpportunity>,
    mut findings: Vec<LeakageFinding>,
) -> AnalyticsReport {
    findings.extend(churn_risks.iter().map(churn_finding));

    let estimated_leakage: Decimal = findings.iter().map(|finding| finding.amount).sum();
    let finding_count = findings.len();

    AnalyticsReport {
        generated_at,
        due_customers,
        churn_risks,
        bundles,
        findings,
        estimated_leakage,
        finding_count,
    }
}

fn churn_finding(risk: &ChurnRisk) -> LeakageFinding {
    LeakageFinding {
        kind: FindingKind::ChurnRisk,
        severity: risk.severity,
        subject: risk.customer_phone.clone(),
        amount: risk.at_risk_amount,
        suggestion: format!(
            "{} is {:.0} days past their usual reorder rhythm; reach out before the relationship lapses",
            risk.customer_name, risk.days_overdue
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::churn::ChurnRisk;
    use crate::domain::finding::{FindingKind, LeakageFinding, Severity};

    use super::aggregate;

    #[test]
    fn empty_inputs_yield_an_empty_well_typed_report() {
        let generated_at = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let report = aggregate(generated_at, Vec::new(), Vec::new(), Vec::new(), Vec::new());

        assert!(report.due_customers.is_empty());
        assert!(report.churn_risks.is_empty());
        assert!(report.bundles.is_empty());
        assert!(report.findings.is_empty());
        assert_eq!(report.estimated_leakage, Decimal::ZERO);
        assert_eq!(report.finding_count, 0);
    }

    #[test]
    fn headline_sums_findings_and_churn_value() {
        let generated_at = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let findings = vec![LeakageFinding {
            kind: FindingKind::DeadInventory,
            severity: Severity::High,
            subject: "SKU-1".to_string(),
            amount: Decimal::from(2_000),
            suggestion: "clearance".to_string(),
        }];
        let churn = vec![ChurnRisk {
            customer_phone: "+1555".to_string(),
            customer_name: "Asha".to_string(),
            lifetime_spend: Decimal::from(10_000),
            days_overdue: 12.0,
            severity: Severity::Medium,
            at_risk_amount: Decimal::from(3_000),
        }];

        let report = aggregate(generated_at, Vec::new(), churn, Vec::new(), findings);

        assert_eq!(report.finding_count, 2);
        assert_eq!(report.estimated_leakage, Decimal::from(5_000));
        assert!(report
            .findings
            .iter()
            .any(|finding| finding.kind == FindingKind::ChurnRisk && finding.subject == "+1555"));
    }
}
