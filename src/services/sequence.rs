use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mints human-readable business identifiers: patient numbers, ticket
/// numbers, receipt numbers.
///
/// One monotonic counter per family, shared across all concurrent requests;
/// `fetch_add` guarantees no two callers observe the same pre-increment
/// value. Counters start at 1 and are NOT reset daily, so the date component
/// alone does not make an identifier unique across process restarts. The
/// emitted value is advisory: callers must run an exists-check against the
/// persisted records and regenerate on collision before committing.
pub struct SequenceNumberGenerator {
    patient: AtomicU64,
    ticket: AtomicU64,
    receipt: AtomicU64,
}

impl SequenceNumberGenerator {
    pub fn new() -> Self {
        Self {
            patient: AtomicU64::new(1),
            ticket: AtomicU64::new(1),
            receipt: AtomicU64::new(1),
        }
    }

    /// Format: PAT-YYYYMMDD-NNNNN
    pub fn patient_number(&self) -> String {
        let counter = self.patient.fetch_add(1, Ordering::Relaxed);
        format!("PAT-{}-{:05}", Self::today(), counter)
    }

    /// Format: TKT-SVC-YYYYMMDD-NNNNN, where SVC is the upper-cased first
    /// three characters of the service name (fewer if the name is shorter)
    pub fn ticket_number(&self, service: &str) -> String {
        let counter = self.ticket.fetch_add(1, Ordering::Relaxed);
        let code: String = service.chars().take(3).collect::<String>().to_uppercase();
        format!("TKT-{}-{}-{:05}", code, Self::today(), counter)
    }

    /// Format: REC-YYYYMMDD-NNNNN
    pub fn receipt_number(&self) -> String {
        let counter = self.receipt.fetch_add(1, Ordering::Relaxed);
        format!("REC-{}-{:05}", Self::today(), counter)
    }

    fn today() -> String {
        Utc::now().format("%Y%m%d").to_string()
    }
}

impl Default for SequenceNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_patient_number_format() {
        let generator = SequenceNumberGenerator::new();
        let number = generator.patient_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PAT");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "00001");
    }

    #[test]
    fn test_ticket_number_uses_service_code() {
        let generator = SequenceNumberGenerator::new();
        let number = generator.ticket_number("radiology");
        assert!(number.starts_with("TKT-RAD-"));
        assert!(number.ends_with("-00001"));
    }

    #[test]
    fn test_short_service_name_keeps_all_characters() {
        let generator = SequenceNumberGenerator::new();
        let number = generator.ticket_number("er");
        assert!(number.starts_with("TKT-ER-"));
    }

    #[test]
    fn test_counters_are_independent_per_family() {
        let generator = SequenceNumberGenerator::new();
        generator.patient_number();
        generator.patient_number();
        // Ticket counter is untouched by patient minting
        assert!(generator.ticket_number("lab").ends_with("-00001"));
        assert!(generator.receipt_number().ends_with("-00001"));
    }

    #[test]
    fn test_concurrent_minting_never_repeats_a_counter() {
        let generator = Arc::new(SequenceNumberGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let generator = generator.clone();
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| generator.ticket_number("radiology")).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(seen.insert(number), "duplicate ticket number minted");
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
