//! Static doctor catalog for the appointment sub-flow

use serde::{Deserialize, Serialize};

/// A bookable doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    /// Display name, including title
    pub name: String,
    /// Clinical specialty
    pub specialty: String,
    /// Reference to the portrait shown next to the doctor
    pub display_image_ref: String,
    /// Average patient rating (0.0-5.0)
    pub rating: f32,
}

impl Doctor {
    /// Create a doctor with the default portrait
    pub fn new(name: impl Into<String>, specialty: impl Into<String>, rating: f32) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            display_image_ref: "person.circle.fill".to_string(),
            rating,
        }
    }
}

/// Immutable list of doctors
#[derive(Debug, Clone)]
pub struct DoctorCatalog {
    doctors: Vec<Doctor>,
}

impl Default for DoctorCatalog {
    fn default() -> Self {
        Self::new(vec![
            Doctor::new("Dr. Sarah Johnson", "Primary Care", 4.9),
            Doctor::new("Dr. Michael Chen", "Internal Medicine", 4.8),
            Doctor::new("Dr. Emily Williams", "Family Medicine", 4.7),
            Doctor::new("Dr. David Kim", "General Practice", 4.6),
        ])
    }
}

impl DoctorCatalog {
    /// Create a catalog from an explicit list
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// All doctors in display order
    pub fn all(&self) -> &[Doctor] {
        &self.doctors
    }

    /// Doctor at a zero-based position
    pub fn get(&self, index: usize) -> Option<&Doctor> {
        self.doctors.get(index)
    }

    /// First doctor whose name contains `query`, ignoring case
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::chat::DoctorCatalog;
    ///
    /// let catalog = DoctorCatalog::default();
    /// let doctor = catalog.find_by_name("chen").unwrap();
    /// assert_eq!(doctor.specialty, "Internal Medicine");
    /// ```
    pub fn find_by_name(&self, query: &str) -> Option<&Doctor> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.doctors
            .iter()
            .find(|doctor| doctor.name.to_lowercase().contains(&query))
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}
