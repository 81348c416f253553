//! Unit tests for typed identifiers
//!
//! Tests cover creation, display formatting, parsing, and the type
//! safety the newtype wrappers provide.

use core_kernel::{AccountId, ObligationId, PartyId, SessionId};
use std::str::FromStr;
use uuid::Uuid;

mod party_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let a = PartyId::new();
        let b = PartyId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_v7_ids_sort_by_creation() {
        let first = PartyId::new_v7();
        let second = PartyId::new_v7();
        assert!(first <= second);
    }

    #[test]
    fn test_display_carries_the_prefix() {
        let id = PartyId::new();
        assert!(id.to_string().starts_with("PTY-"));
    }

    #[test]
    fn test_from_uuid_preserves_the_uuid() {
        let uuid = Uuid::new_v4();
        let id = PartyId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_round_trips() {
        let id = PartyId::new();
        let parsed = PartyId::from_str(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_str_rejects_wrong_prefix() {
        let other = SessionId::new();
        assert!(PartyId::from_str(&other.to_string()).is_err());
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(PartyId::from_str("PTY-not-a-uuid").is_err());
        assert!(PartyId::from_str("no-prefix-at-all").is_err());
    }
}

mod prefix_tests {
    use super::*;

    #[test]
    fn test_each_id_type_has_its_own_prefix() {
        assert!(AccountId::new().to_string().starts_with("ACC-"));
        assert!(ObligationId::new().to_string().starts_with("OBL-"));
        assert!(SessionId::new().to_string().starts_with("SES-"));
    }

    #[test]
    fn test_same_uuid_different_types_stay_distinct() {
        let uuid = Uuid::new_v4();
        let party_id = PartyId::from_uuid(uuid);
        let session_id = SessionId::from_uuid(uuid);

        // Equal underlying uuids, but the types never compare as one.
        assert_eq!(*party_id.as_uuid(), *session_id.as_uuid());
        assert_ne!(party_id.to_string(), session_id.to_string());
    }
}

mod serialization_tests {
    use super::*;

    #[test]
    fn test_id_round_trips_through_json() {
        let id = ObligationId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: ObligationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
