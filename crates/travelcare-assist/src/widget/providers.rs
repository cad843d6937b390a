//! Provider network search.

use std::fmt;
use std::sync::Arc;

use travelcare_core::catalog::{Catalog, Provider, ProviderKind};

use super::{WidgetOutcome, WidgetSignal};
use crate::error::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderFilter {
    #[default]
    All,
    Kind(ProviderKind),
}

impl fmt::Display for ProviderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFilter::All => write!(f, "All"),
            ProviderFilter::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

impl ProviderFilter {
    pub fn matches(&self, provider: &Provider) -> bool {
        match self {
            ProviderFilter::All => true,
            ProviderFilter::Kind(kind) => provider.kind == *kind,
        }
    }
}

impl std::str::FromStr for ProviderFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ProviderFilter::All),
            "hospital" | "hospitals" => Ok(ProviderFilter::Kind(ProviderKind::Hospital)),
            "doctor" | "doctors" => Ok(ProviderFilter::Kind(ProviderKind::Doctor)),
            "clinic" | "clinics" => Ok(ProviderFilter::Kind(ProviderKind::Clinic)),
            _ => Err(format!("Unknown provider filter: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSearch {
    catalog: Arc<Catalog>,
    term: String,
    filter: ProviderFilter,
}

impl ProviderSearch {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            term: String::new(),
            filter: ProviderFilter::All,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn filter(&self) -> ProviderFilter {
        self.filter
    }

    pub fn search(&mut self, term: &str) -> WidgetSignal {
        self.term = term.trim().to_string();
        WidgetSignal::Updated
    }

    pub fn set_filter(&mut self, filter: ProviderFilter) -> WidgetSignal {
        self.filter = filter;
        WidgetSignal::Updated
    }

    /// Providers matching the term (name or specialty) and the kind filter.
    pub fn results(&self) -> Vec<&Provider> {
        let term = self.term.to_lowercase();
        self.catalog
            .providers
            .iter()
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(&term)
                    || p.specialty.to_lowercase().contains(&term)
            })
            .filter(|p| self.filter.matches(p))
            .collect()
    }

    /// Request a visit with a provider.
    pub fn book(&self, provider_id: u32) -> Result<WidgetSignal, WidgetError> {
        if self.catalog.provider(provider_id).is_none() {
            return Err(WidgetError::UnknownProvider(provider_id));
        }
        Ok(WidgetSignal::Complete(WidgetOutcome::BookProvider {
            provider_id,
        }))
    }

    pub fn describe(&self) -> String {
        let results = self.results();
        let mut lines = vec![format!(
            "[providers: \"{}\" / {} - {} found]",
            self.term,
            self.filter,
            results.len()
        )];
        for p in results {
            lines.push(format!(
                "  {}. {} ({}, {}) - {} - {:.1} km - ★{} - {}",
                p.id,
                p.name,
                p.kind,
                p.specialty,
                p.address,
                p.distance_km,
                p.rating,
                p.next_available.as_deref().unwrap_or("call ahead")
            ));
        }
        lines.join("\n")
    }
}
