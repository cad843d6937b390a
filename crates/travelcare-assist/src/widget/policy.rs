//! Policy summary view.

use chrono::NaiveDate;
use travelcare_core::catalog::{Catalog, PolicyCoverageLine};
use travelcare_core::types::Profile;

#[derive(Debug, Clone, PartialEq)]
pub struct PolicySummary {
    pub holder: String,
    pub policy_number: String,
    pub active: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dependents: u32,
    pub coverage: Vec<PolicyCoverageLine>,
}

/// The policy widget. Shows `Loading` until a profile is available.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyView {
    Loading,
    Ready(PolicySummary),
}

impl PolicyView {
    pub fn open(profile: Option<&Profile>, catalog: &Catalog, today: NaiveDate) -> Self {
        match profile {
            None => PolicyView::Loading,
            Some(p) => PolicyView::Ready(PolicySummary {
                holder: p.name.clone(),
                policy_number: p.policy_number.clone(),
                active: p.is_active_on(today),
                start: p.policy_start_date,
                end: p.policy_end_date,
                dependents: p.dependents,
                coverage: catalog.policy_coverage.clone(),
            }),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PolicyView::Loading)
    }

    pub fn describe(&self) -> String {
        let summary = match self {
            PolicyView::Loading => return "[policy: loading]".to_string(),
            PolicyView::Ready(summary) => summary,
        };

        let status = if summary.active { "Active" } else { "Expired" };
        let mut lines = vec![
            format!("[policy: {} - {}]", summary.policy_number, status),
            format!("  Holder: {}", summary.holder),
            format!(
                "  Valid: {} to {}",
                summary.start.format("%b %d, %Y"),
                summary.end.format("%b %d, %Y")
            ),
            format!("  Dependents: {}", summary.dependents),
        ];
        for line in &summary.coverage {
            let mark = if line.covered { "✓" } else { "✗" };
            lines.push(format!("  {} {} - {}", mark, line.item, line.limit));
        }
        lines.join("\n")
    }
}
