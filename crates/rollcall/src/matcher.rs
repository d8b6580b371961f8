//! Identifier matching for rollcall.
//!
//! Resolves a scanned code (QR payload or NFC serial) to a roster entry.

use crate::attendance::ScanMethod;
use crate::roster::Student;

/// Policy knobs for identifier matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Whether a code read on one path may match the other path's field:
    /// an NFC read matching a student's `qrCode` and vice versa. Useful
    /// when tags are provisioned with the printed QR value, but it also
    /// means the two code spaces must not overlap across students.
    pub cross_method_fallback: bool,
}

impl MatchPolicy {
    /// Create a policy with the given fallback setting.
    #[must_use]
    pub fn new(cross_method_fallback: bool) -> Self {
        Self {
            cross_method_fallback,
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            cross_method_fallback: true,
        }
    }
}

/// Resolve a scanned code to a roster entry.
///
/// Linear scan in roster order; the first matching student wins, so
/// duplicate codes resolve to whichever student hydration listed first.
/// Comparison is exact string equality: no trimming, no case folding.
///
/// With the policy's fallback enabled both identifier fields are checked
/// regardless of `method`; with it disabled only the field native to the
/// scan path is consulted.
#[must_use]
pub fn match_code<'a>(
    roster: &'a [Student],
    code: &str,
    method: ScanMethod,
    policy: MatchPolicy,
) -> Option<&'a Student> {
    roster.iter().find(|student| {
        if policy.cross_method_fallback {
            student.nfc_id.as_deref() == Some(code) || student.qr_code == code
        } else {
            match method {
                ScanMethod::Qr => student.qr_code == code,
                ScanMethod::Nfc => student.nfc_id.as_deref() == Some(code),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Student> {
        vec![
            Student::new("1", "Ahmad Fauzi", "XII-IPA-1", "STD001"),
            Student::new("2", "Siti Aminah", "XII-IPA-1", "STD002").with_nfc_id("04:A2:19:B3"),
        ]
    }

    #[test]
    fn test_match_qr_code_on_qr_path() {
        let roster = roster();
        let student = match_code(&roster, "STD001", ScanMethod::Qr, MatchPolicy::default());
        assert_eq!(student.map(|s| s.id.as_str()), Some("1"));
    }

    #[test]
    fn test_match_nfc_serial_on_nfc_path() {
        let roster = roster();
        let student = match_code(
            &roster,
            "04:A2:19:B3",
            ScanMethod::Nfc,
            MatchPolicy::default(),
        );
        assert_eq!(student.map(|s| s.id.as_str()), Some("2"));
    }

    #[test]
    fn test_fallback_qr_code_matches_on_nfc_path() {
        let roster = roster();
        let student = match_code(&roster, "STD001", ScanMethod::Nfc, MatchPolicy::default());
        assert_eq!(student.map(|s| s.id.as_str()), Some("1"));
    }

    #[test]
    fn test_fallback_nfc_serial_matches_on_qr_path() {
        let roster = roster();
        let student = match_code(
            &roster,
            "04:A2:19:B3",
            ScanMethod::Qr,
            MatchPolicy::default(),
        );
        assert_eq!(student.map(|s| s.id.as_str()), Some("2"));
    }

    #[test]
    fn test_strict_policy_checks_native_field_only() {
        let roster = roster();
        let policy = MatchPolicy::new(false);

        assert!(match_code(&roster, "STD001", ScanMethod::Nfc, policy).is_none());
        assert!(match_code(&roster, "04:A2:19:B3", ScanMethod::Qr, policy).is_none());
        assert!(match_code(&roster, "STD001", ScanMethod::Qr, policy).is_some());
        assert!(match_code(&roster, "04:A2:19:B3", ScanMethod::Nfc, policy).is_some());
    }

    #[test]
    fn test_first_match_wins_on_duplicate_codes() {
        let roster = vec![
            Student::new("1", "Ahmad Fauzi", "XII-IPA-1", "STD001"),
            Student::new("2", "Siti Aminah", "XII-IPA-1", "STD001"),
        ];
        let student = match_code(&roster, "STD001", ScanMethod::Qr, MatchPolicy::default());
        assert_eq!(student.map(|s| s.id.as_str()), Some("1"));
    }

    #[test]
    fn test_exact_equality_no_normalization() {
        let roster = roster();
        let policy = MatchPolicy::default();

        assert!(match_code(&roster, "std001", ScanMethod::Qr, policy).is_none());
        assert!(match_code(&roster, "STD001 ", ScanMethod::Qr, policy).is_none());
        assert!(match_code(&roster, " STD001", ScanMethod::Qr, policy).is_none());
    }

    #[test]
    fn test_unknown_code_is_not_found() {
        let roster = roster();
        assert!(match_code(&roster, "STD999", ScanMethod::Qr, MatchPolicy::default()).is_none());
    }

    #[test]
    fn test_empty_roster_is_not_found() {
        assert!(match_code(&[], "STD001", ScanMethod::Qr, MatchPolicy::default()).is_none());
    }

    #[test]
    fn test_student_without_tag_never_matches_nfc_field() {
        let roster = vec![Student::new("1", "Ahmad Fauzi", "XII-IPA-1", "STD001")];
        let policy = MatchPolicy::new(false);
        assert!(match_code(&roster, "STD001", ScanMethod::Nfc, policy).is_none());
    }
}
