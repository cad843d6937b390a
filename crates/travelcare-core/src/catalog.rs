//! Read-only reference data for the assistant.
//!
//! The catalog is built once and injected into the dispatcher and widgets.
//! [`Catalog::demo`] returns the fictional data set the app ships with; no
//! external system is contacted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::types::Euros;

/// An in-person doctor that can be booked through the booking widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub next_available: String,
    pub fee: Euros,
    pub rating: f32,
}

/// A doctor offering video consultations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemedicineDoctor {
    pub id: u32,
    pub name: String,
    pub specialty: String,
    pub availability: String,
    pub fee: Euros,
    pub rating: f32,
    pub languages: Vec<String>,
    pub wait_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Hospital,
    Doctor,
    Clinic,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Hospital => write!(f, "Hospital"),
            ProviderKind::Doctor => write!(f, "Doctor"),
            ProviderKind::Clinic => write!(f, "Clinic"),
        }
    }
}

/// A facility or practitioner in the provider network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: u32,
    pub name: String,
    pub kind: ProviderKind,
    pub specialty: String,
    pub address: String,
    pub distance_km: f32,
    pub rating: f32,
    pub available: bool,
    pub phone: String,
    pub languages: Vec<String>,
    pub accepts_insurance: bool,
    pub next_available: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageCategory {
    Emergency,
    GeneralCare,
    Dental,
    MentalHealth,
    Pharmacy,
}

impl fmt::Display for CoverageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageCategory::Emergency => write!(f, "Emergency"),
            CoverageCategory::GeneralCare => write!(f, "General Care"),
            CoverageCategory::Dental => write!(f, "Dental"),
            CoverageCategory::MentalHealth => write!(f, "Mental Health"),
            CoverageCategory::Pharmacy => write!(f, "Pharmacy"),
        }
    }
}

/// A searchable coverage rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageItem {
    pub condition: String,
    pub category: CoverageCategory,
    pub covered: bool,
    pub description: String,
    pub limit: String,
    pub notes: String,
}

/// One line of the policy summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCoverageLine {
    pub item: String,
    pub limit: String,
    pub covered: bool,
}

/// All reference data used by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub doctors: Vec<Doctor>,
    pub telemedicine_doctors: Vec<TelemedicineDoctor>,
    pub providers: Vec<Provider>,
    pub coverage_items: Vec<CoverageItem>,
    pub policy_coverage: Vec<PolicyCoverageLine>,
    pub time_slots: Vec<String>,
}

impl Catalog {
    /// Parse a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn doctor(&self, id: u32) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn telemedicine_doctor(&self, id: u32) -> Option<&TelemedicineDoctor> {
        self.telemedicine_doctors.iter().find(|d| d.id == id)
    }

    pub fn provider(&self, id: u32) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn has_time_slot(&self, slot: &str) -> bool {
        self.time_slots.iter().any(|s| s == slot)
    }

    /// The fictional data set shipped with the app.
    pub fn demo() -> Self {
        fn langs(list: &[&str]) -> Vec<String> {
            list.iter().map(|l| l.to_string()).collect()
        }

        let doctors = vec![
            Doctor {
                id: 1,
                name: "Dr. Sarah Chen".to_string(),
                specialty: "General Practice".to_string(),
                next_available: "Today 2:30 PM".to_string(),
                fee: Euros::whole(45),
                rating: 4.9,
            },
            Doctor {
                id: 2,
                name: "Dr. Michael Ross".to_string(),
                specialty: "Internal Medicine".to_string(),
                next_available: "Today 4:00 PM".to_string(),
                fee: Euros::whole(50),
                rating: 4.7,
            },
            Doctor {
                id: 3,
                name: "Dr. Emily Watson".to_string(),
                specialty: "Family Medicine".to_string(),
                next_available: "Tomorrow 9:00 AM".to_string(),
                fee: Euros::whole(45),
                rating: 4.8,
            },
        ];

        let telemedicine_doctors = vec![
            TelemedicineDoctor {
                id: 1,
                name: "Dr. Emily Johnson".to_string(),
                specialty: "General Practice".to_string(),
                availability: "Available Now".to_string(),
                fee: Euros::whole(25),
                rating: 4.9,
                languages: langs(&["English", "Spanish"]),
                wait_time: "< 5 min".to_string(),
            },
            TelemedicineDoctor {
                id: 2,
                name: "Dr. James Wilson".to_string(),
                specialty: "Travel Medicine".to_string(),
                availability: "Available in 10 min".to_string(),
                fee: Euros::whole(35),
                rating: 4.8,
                languages: langs(&["English", "French"]),
                wait_time: "10 min".to_string(),
            },
            TelemedicineDoctor {
                id: 3,
                name: "Dr. Lisa Zhang".to_string(),
                specialty: "Emergency Care".to_string(),
                availability: "Available Now".to_string(),
                fee: Euros::whole(40),
                rating: 4.7,
                languages: langs(&["English", "Mandarin"]),
                wait_time: "< 2 min".to_string(),
            },
        ];

        let providers = vec![
            Provider {
                id: 1,
                name: "City General Hospital".to_string(),
                kind: ProviderKind::Hospital,
                specialty: "Emergency Care".to_string(),
                address: "123 Main St, Downtown".to_string(),
                distance_km: 0.8,
                rating: 4.8,
                available: true,
                phone: "+1-555-0123".to_string(),
                languages: langs(&["English", "Spanish"]),
                accepts_insurance: true,
                next_available: Some("Now".to_string()),
            },
            Provider {
                id: 2,
                name: "Dr. Sarah Johnson".to_string(),
                kind: ProviderKind::Doctor,
                specialty: "General Practice".to_string(),
                address: "Medical Center, Suite 201".to_string(),
                distance_km: 1.2,
                rating: 4.9,
                available: true,
                phone: "+1-555-0456".to_string(),
                languages: langs(&["English", "French"]),
                accepts_insurance: true,
                next_available: Some("In 30 min".to_string()),
            },
            Provider {
                id: 3,
                name: "Metro Urgent Care".to_string(),
                kind: ProviderKind::Clinic,
                specialty: "Urgent Care".to_string(),
                address: "789 Health Blvd".to_string(),
                distance_km: 2.1,
                rating: 4.6,
                available: true,
                phone: "+1-555-0789".to_string(),
                languages: langs(&["English"]),
                accepts_insurance: true,
                next_available: Some("In 15 min".to_string()),
            },
        ];

        let coverage = |condition: &str,
                        category: CoverageCategory,
                        covered: bool,
                        description: &str,
                        limit: &str,
                        notes: &str| CoverageItem {
            condition: condition.to_string(),
            category,
            covered,
            description: description.to_string(),
            limit: limit.to_string(),
            notes: notes.to_string(),
        };

        let coverage_items = vec![
            coverage(
                "Emergency Room Visit",
                CoverageCategory::Emergency,
                true,
                "Full coverage for emergency medical treatment",
                "€100,000 per incident",
                "Available 24/7 worldwide",
            ),
            coverage(
                "General Practitioner Visit",
                CoverageCategory::GeneralCare,
                true,
                "Consultation with general practitioners",
                "€100 per visit",
                "Up to 10 visits per year",
            ),
            coverage(
                "Emergency Dental Treatment",
                CoverageCategory::Dental,
                true,
                "Emergency dental care for accidents or severe pain",
                "€1,500 per year",
                "Does not include routine cleanings",
            ),
            coverage(
                "Prescription Medications",
                CoverageCategory::Pharmacy,
                true,
                "Prescribed medications from licensed pharmacies",
                "€5,000 per year",
                "Generic drugs preferred",
            ),
            coverage(
                "Mental Health Counseling",
                CoverageCategory::MentalHealth,
                true,
                "Counseling and therapy sessions",
                "€2,000 per year",
                "Up to 20 sessions per year",
            ),
            coverage(
                "Cosmetic Surgery",
                CoverageCategory::GeneralCare,
                false,
                "Not covered unless medically necessary",
                "Not covered",
                "Exceptions for accident-related reconstructive surgery",
            ),
            coverage(
                "Pre-existing Conditions",
                CoverageCategory::GeneralCare,
                false,
                "Conditions diagnosed before policy start date",
                "Not covered",
                "Check policy for specific exclusions",
            ),
        ];

        let line = |item: &str, limit: &str, covered: bool| PolicyCoverageLine {
            item: item.to_string(),
            limit: limit.to_string(),
            covered,
        };

        let policy_coverage = vec![
            line("Emergency Medical Care", "€100,000", true),
            line("Hospitalization", "€100,000", true),
            line("Emergency Dental", "€1,500", true),
            line("Prescription Medications", "€5,000", true),
            line("Medical Evacuation", "€1,000,000", true),
            line("Telemedicine Consultations", "Unlimited", true),
            line("Pre-existing Conditions", "Not Covered", false),
        ];

        let time_slots = [
            "9:00 AM", "10:00 AM", "11:00 AM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            doctors,
            telemedicine_doctors,
            providers,
            coverage_items,
            policy_coverage,
            time_slots,
        }
    }
}
