//! Unit tests for sequential codes and client references

use chrono::NaiveDate;
use core_kernel::identifiers::REFERENCE_NAME_MAX;
use core_kernel::{
    sanitize_client_name, AllocationError, ClaimCode, ClientCode, ClientId, ClientReference,
    SequenceKind, ShipmentId, UserId,
};
use uuid::Uuid;

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

mod uuid_id_tests {
    use super::*;

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = ShipmentId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = ShipmentId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(ClientId::prefix(), "CLI");
        assert_eq!(ShipmentId::prefix(), "SHP");
        assert_eq!(UserId::prefix(), "USR");
    }

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let original = ClientId::new_v7();
        let parsed: ClientId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: ClientId = original.as_uuid().to_string().parse().unwrap();
        assert_eq!(original, bare);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("CLI-not-a-uuid".parse::<ClientId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::now_v7();
        let id = UserId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}

mod client_code_tests {
    use super::*;

    #[test]
    fn test_first_and_next() {
        let first = ClientCode::first();
        assert_eq!(first.to_string(), "CL00001");
        assert_eq!(first.next().unwrap().to_string(), "CL00002");
    }

    #[test]
    fn test_parse_accepts_wider_numbers_up_to_max() {
        assert_eq!(ClientCode::parse("CL00017").unwrap().sequence(), 17);
        assert_eq!(ClientCode::parse("CL99999").unwrap().sequence(), 99_999);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let last = ClientCode::from_sequence(ClientCode::MAX).unwrap();
        assert_eq!(
            last.next(),
            Err(AllocationError::Exhausted {
                kind: SequenceKind::Client,
                max: 99_999
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for value in ["", "CL", "CLX0001", "CL-0001", "XX00001", "CL00000", "CL000a1"] {
            assert!(
                matches!(ClientCode::parse(value), Err(AllocationError::Unparseable { .. })),
                "expected {value:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_serde_round_trip_through_string() {
        let code = ClientCode::from_sequence(3).unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"CL00003\"");
        let back: ClientCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<ClientCode>("\"bogus\"").is_err());
    }
}

mod claim_code_tests {
    use super::*;

    #[test]
    fn test_width_is_six() {
        assert_eq!(ClaimCode::from_sequence(123).unwrap().to_string(), "CLM000123");
        assert_eq!(ClaimCode::MAX, 999_999);
    }

    #[test]
    fn test_zero_is_out_of_range() {
        assert!(matches!(
            ClaimCode::from_sequence(0),
            Err(AllocationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_sequence_kind_max_matches_code() {
        assert_eq!(SequenceKind::Claim.max_value(), ClaimCode::MAX);
        assert_eq!(SequenceKind::Client.max_value(), ClientCode::MAX);
    }
}

mod reference_tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_and_truncates() {
        assert_eq!(sanitize_client_name("Acme Corp!"), "AcmeCorp");
        assert_eq!(
            sanitize_client_name("International Freight Partners"),
            "InternationalFr"
        );
        assert_eq!(sanitize_client_name("International Freight").len(), REFERENCE_NAME_MAX);
        assert_eq!(sanitize_client_name("!!!"), "");
    }

    #[test]
    fn test_display_format() {
        let reference = ClientReference::new("AcmeCorp", 1, june_first());
        assert_eq!(reference.to_string(), "AcmeCorp-1-20250601");
    }

    #[test]
    fn test_parse_empty_name_segment() {
        let reference = ClientReference::parse("-3-20250601").unwrap();
        assert_eq!(reference.name(), "");
        assert_eq!(reference.number(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ClientReference::parse("AcmeCorp-x-20250601").is_none());
        assert!(ClientReference::parse("AcmeCorp-1-2025-06-01").is_none());
        assert!(ClientReference::parse("AcmeCorp").is_none());
    }

    #[test]
    fn test_is_for_matches_name_and_day() {
        let reference = ClientReference::new("AcmeCorp", 2, june_first());
        assert!(reference.is_for("AcmeCorp", june_first()));
        assert!(!reference.is_for("Acme", june_first()));
        assert!(!reference.is_for("AcmeCorp", june_first().succ_opt().unwrap()));
    }

    #[test]
    fn test_prefix_and_suffix_helpers() {
        assert_eq!(ClientReference::name_prefix("AcmeCorp"), "AcmeCorp-");
        assert_eq!(ClientReference::date_suffix(june_first()), "-20250601");
    }
}
