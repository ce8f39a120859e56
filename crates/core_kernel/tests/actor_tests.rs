//! Tests for actor and role types

use core_kernel::{Actor, Role, UserId};

mod role_tests {
    use super::*;

    #[test]
    fn test_all_roles_have_distinct_wire_names() {
        let mut names: Vec<&str> = Role::all().iter().map(|r| r.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Role::ApprovingAuthority.to_string(), "Approving Authority");
        assert_eq!(Role::NgoViewer.to_string(), "NGO Viewer");
    }

    #[test]
    fn test_parse_wire_names() {
        let role: Role = "Verification Officer".parse().unwrap();
        assert_eq!(role, Role::VerificationOfficer);
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        assert!("verification_officer".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        for role in Role::all() {
            let json = serde_json::to_string(role).unwrap();
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(*role, back);
        }
    }
}

mod actor_tests {
    use super::*;

    #[test]
    fn test_actor_with_multiple_roles() {
        let actor = Actor::new(
            UserId::new(),
            "Ravi Kumar",
            vec![Role::Citizen, Role::FieldWorker],
        );
        assert!(actor.has_role(Role::Citizen));
        assert!(actor.has_role(Role::FieldWorker));
        assert!(!actor.has_role(Role::SuperAdmin));
    }

    #[test]
    fn test_has_any_role() {
        let actor = Actor::new(UserId::new(), "Meena Devi", vec![Role::Citizen]);
        assert!(actor.has_any_role(&[Role::Citizen, Role::VerificationOfficer]));
        assert!(!actor.has_any_role(&[Role::VerificationOfficer, Role::ApprovingAuthority]));
    }

    #[test]
    fn test_super_admin_flag() {
        let admin = Actor::new(UserId::new(), "Admin", vec![Role::SuperAdmin]);
        assert!(admin.is_super_admin());
    }

    #[test]
    fn test_district_and_state_builders() {
        let actor = Actor::new(UserId::new(), "Officer", vec![Role::VerificationOfficer])
            .with_district("Mandla")
            .with_state("Madhya Pradesh");
        assert_eq!(actor.district.as_deref(), Some("Mandla"));
        assert_eq!(actor.state.as_deref(), Some("Madhya Pradesh"));
    }

    #[test]
    fn test_actor_serde_roundtrip() {
        let actor = Actor::new(UserId::new(), "Asha", vec![Role::SchemeAdmin]);
        let json = serde_json::to_string(&actor).unwrap();
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, back);
    }
}
