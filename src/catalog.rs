//! Specialty catalog
//!
//! Fixed table of the specialist roles the assistant can take on. Unknown
//! keys resolve to the general practitioner role.

use serde::{Deserialize, Serialize};

/// Specialist role selected when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    #[default]
    General,
    Dentist,
    Cardiologist,
    Dermatologist,
    Neurologist,
    Orthopedist,
    Pediatrician,
    Psychiatrist,
    Gynecologist,
    Ophthalmologist,
}

impl Specialty {
    pub const ALL: [Specialty; 10] = [
        Specialty::General,
        Specialty::Dentist,
        Specialty::Cardiologist,
        Specialty::Dermatologist,
        Specialty::Neurologist,
        Specialty::Orthopedist,
        Specialty::Pediatrician,
        Specialty::Psychiatrist,
        Specialty::Gynecologist,
        Specialty::Ophthalmologist,
    ];

    /// Resolve a catalog key, falling back to `General` for anything unknown
    pub fn from_key(key: &str) -> Self {
        let normalized = key.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.key() == normalized)
            .unwrap_or_else(|| {
                if !normalized.is_empty() {
                    tracing::debug!(key = %normalized, "Unknown specialty, using general");
                }
                Specialty::General
            })
    }

    /// Catalog key as used by clients (`doctorType`)
    pub fn key(self) -> &'static str {
        match self {
            Specialty::General => "general",
            Specialty::Dentist => "dentist",
            Specialty::Cardiologist => "cardiologist",
            Specialty::Dermatologist => "dermatologist",
            Specialty::Neurologist => "neurologist",
            Specialty::Orthopedist => "orthopedist",
            Specialty::Pediatrician => "pediatrician",
            Specialty::Psychiatrist => "psychiatrist",
            Specialty::Gynecologist => "gynecologist",
            Specialty::Ophthalmologist => "ophthalmologist",
        }
    }

    /// Title-cased name for user-facing text
    pub fn display_name(self) -> &'static str {
        match self {
            Specialty::General => "General",
            Specialty::Dentist => "Dentist",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Dermatologist => "Dermatologist",
            Specialty::Neurologist => "Neurologist",
            Specialty::Orthopedist => "Orthopedist",
            Specialty::Pediatrician => "Pediatrician",
            Specialty::Psychiatrist => "Psychiatrist",
            Specialty::Gynecologist => "Gynecologist",
            Specialty::Ophthalmologist => "Ophthalmologist",
        }
    }

    /// Role description handed to the generation service
    pub fn role(self) -> &'static str {
        match self {
            Specialty::General => "You are a general practitioner with extensive medical knowledge. You provide comprehensive healthcare advice and can handle a wide range of medical conditions.",
            Specialty::Dentist => "You are a dentist expert specializing in oral health, dental care, teeth problems, gum diseases, and dental procedures. You focus on dental and oral health issues.",
            Specialty::Cardiologist => "You are a cardiology expert specializing in heart conditions, cardiovascular diseases, blood pressure issues, and heart-related symptoms.",
            Specialty::Dermatologist => "You are a dermatology expert specializing in skin conditions, skin diseases, rashes, acne, and all skin-related health issues.",
            Specialty::Neurologist => "You are a neurology expert specializing in brain and nervous system disorders, headaches, migraines, and neurological conditions.",
            Specialty::Orthopedist => "You are an orthopedic expert specializing in bone, joint, muscle, and skeletal system problems and injuries.",
            Specialty::Pediatrician => "You are a pediatrician expert specializing in children's health, childhood diseases, and medical care for infants, children, and adolescents.",
            Specialty::Psychiatrist => "You are a psychiatry expert specializing in mental health, psychological disorders, anxiety, depression, and emotional well-being.",
            Specialty::Gynecologist => "You are a gynecology expert specializing in women's reproductive health, pregnancy, menstrual issues, and female health concerns.",
            Specialty::Ophthalmologist => "You are an ophthalmology expert specializing in eye health, vision problems, eye diseases, and eye-related medical conditions.",
        }
    }
}

/// Look up the role description for a raw `doctorType` key
#[allow(dead_code)] // Catalog API; the engine resolves through `Specialty`
pub fn lookup_role(key: &str) -> &'static str {
    Specialty::from_key(key).role()
}
