//! Coverage search.

use std::sync::Arc;

use travelcare_core::catalog::{Catalog, CoverageCategory, CoverageItem};

use super::WidgetSignal;

#[derive(Debug, Clone)]
pub struct CoverageSearch {
    catalog: Arc<Catalog>,
    term: String,
    category: Option<CoverageCategory>,
}

impl CoverageSearch {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            term: String::new(),
            category: None,
        }
    }

    pub fn search(&mut self, term: &str) -> WidgetSignal {
        self.term = term.trim().to_string();
        WidgetSignal::Updated
    }

    /// `None` shows every category.
    pub fn set_category(&mut self, category: Option<CoverageCategory>) -> WidgetSignal {
        self.category = category;
        WidgetSignal::Updated
    }

    pub fn category(&self) -> Option<CoverageCategory> {
        self.category
    }

    /// Items whose condition or description contains the term.
    pub fn results(&self) -> Vec<&CoverageItem> {
        let term = self.term.to_lowercase();
        self.catalog
            .coverage_items
            .iter()
            .filter(|item| {
                term.is_empty()
                    || item.condition.to_lowercase().contains(&term)
                    || item.description.to_lowercase().contains(&term)
            })
            .filter(|item| self.category.map_or(true, |c| item.category == c))
            .collect()
    }

    pub fn describe(&self) -> String {
        let results = self.results();
        let category = self
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "All".to_string());
        let mut lines = vec![format!(
            "[coverage: \"{}\" / {} - {} found]",
            self.term,
            category,
            results.len()
        )];
        for item in results {
            let status = if item.covered { "Covered" } else { "Not Covered" };
            lines.push(format!(
                "  {} ({}) - {} - {}. {}",
                item.condition, item.category, status, item.limit, item.notes
            ));
        }
        lines.join("\n")
    }
}

/// Parse a category name as typed by a user.
pub fn parse_category(s: &str) -> Option<Option<CoverageCategory>> {
    match s.to_lowercase().replace(['-', '_'], " ").trim() {
        "all" => Some(None),
        "emergency" => Some(Some(CoverageCategory::Emergency)),
        "general" | "general care" => Some(Some(CoverageCategory::GeneralCare)),
        "dental" => Some(Some(CoverageCategory::Dental)),
        "mental" | "mental health" => Some(Some(CoverageCategory::MentalHealth)),
        "pharmacy" => Some(Some(CoverageCategory::Pharmacy)),
        _ => None,
    }
}
