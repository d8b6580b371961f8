//! Student roster types for rollcall.
//!
//! This module defines the [`Student`] entity, the built-in seed roster the
//! store starts from, and roster search used by the management commands.

use serde::{Deserialize, Serialize};

/// One enrolled student.
///
/// Field names serialize in the camelCase form the sheet endpoint uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Opaque unique identifier, stable for the student's lifetime.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Class the student belongs to.
    pub class_name: String,

    /// Code printed or encoded for optical scanning. Uniqueness across the
    /// roster is a soft invariant; the store does not enforce it.
    pub qr_code: String,

    /// Serial of an associated proximity tag, absent if no tag is enrolled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfc_id: Option<String>,

    /// Display-only photo reference, no semantic role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Student {
    /// Create a new student without an NFC tag or photo.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        class_name: impl Into<String>,
        qr_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class_name: class_name.into(),
            qr_code: qr_code.into(),
            nfc_id: None,
            photo: None,
        }
    }

    /// Attach an NFC tag serial.
    #[must_use]
    pub fn with_nfc_id(mut self, nfc_id: impl Into<String>) -> Self {
        self.nfc_id = Some(nfc_id.into());
        self
    }

    /// Attach a photo reference.
    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    /// Check whether the student has a proximity tag enrolled.
    #[must_use]
    pub fn has_nfc_tag(&self) -> bool {
        self.nfc_id.is_some()
    }
}

/// The demonstration roster the store starts with.
///
/// Used until (and unless) a configured sheet endpoint replaces it via
/// hydration, so capture works out of the box in local mode.
#[must_use]
pub fn seed_roster() -> Vec<Student> {
    vec![
        Student::new("1", "Ahmad Fauzi", "XII-IPA-1", "STD001")
            .with_photo("https://picsum.photos/seed/ahmad/100"),
        Student::new("2", "Siti Aminah", "XII-IPA-1", "STD002")
            .with_photo("https://picsum.photos/seed/siti/100"),
        Student::new("3", "Budi Santoso", "XII-IPS-2", "STD003")
            .with_photo("https://picsum.photos/seed/budi/100"),
    ]
}

/// Filter a roster by a case-insensitive substring of name or class.
///
/// An empty term matches every student.
#[must_use]
pub fn search(roster: &[Student], term: &str) -> Vec<Student> {
    let needle = term.to_lowercase();
    roster
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.class_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
