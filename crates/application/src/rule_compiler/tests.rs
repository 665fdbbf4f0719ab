use chrono::{Duration, Utc};
use lectern_domain::{
    Action, BulkCoupon, Entitlement, EntitlementType, Purchase, PurchaseStatus, ResourceContext,
    ResourceId, ResourceRef, ResourceState, ResourceType, Role, SubjectAttributes, SubjectType,
    TeamSubscription, UserId, ViewerContext, ViewerUser, Visibility,
};
use serde_json::json;

use super::RuleCompiler;
use crate::AccessPolicyConfig;

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("test user id"))
}

fn resource_id(value: &str) -> ResourceId {
    ResourceId::new(value).unwrap_or_else(|_| panic!("test resource id"))
}

fn user(id: &str, roles: &[&str]) -> ViewerUser {
    ViewerUser {
        roles: roles.iter().map(|role| Role::named(*role)).collect(),
        ..ViewerUser::new(user_id(id))
    }
}

fn signed_in(viewer: ViewerUser) -> ViewerContext {
    ViewerContext {
        user: Some(viewer),
        ..ViewerContext::anonymous("US")
    }
}

fn content(id: &str) -> SubjectAttributes {
    SubjectAttributes::with_id(id)
}

fn published_content(id: &str) -> SubjectAttributes {
    SubjectAttributes {
        state: Some(ResourceState::Published.as_str().to_owned()),
        visibility: Some(Visibility::Public.as_str().to_owned()),
        ..SubjectAttributes::with_id(id)
    }
}

fn subscription_entitlement(expires_in: Option<Duration>) -> Entitlement {
    Entitlement {
        entitlement_type: "et-1".to_owned(),
        expires: expires_in.map(|offset| Utc::now() + offset),
        metadata: json!(null),
    }
}

fn subscription_access_type() -> EntitlementType {
    EntitlementType {
        id: "et-1".to_owned(),
        name: "subscription_access".to_owned(),
    }
}

fn workshop_with_lessons(lessons: &[&str]) -> ResourceContext {
    let mut workshop = ResourceContext::new(resource_id("workshop-1"), ResourceType::Workshop);
    workshop.resources = lessons
        .iter()
        .map(|lesson| ResourceRef {
            resource_id: resource_id(lesson),
        })
        .collect();
    workshop
}

#[test]
fn anonymous_viewer_gets_only_published_public_content() {
    let ability = RuleCompiler::default().ability_for(&ViewerContext::anonymous("US"));

    assert!(ability.can(
        Action::Read,
        SubjectType::Content,
        Some(&published_content("post-1"))
    ));
    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("post-1"))));
    assert!(ability.cannot(Action::Read, SubjectType::Content, None));
    assert!(ability.cannot(Action::Read, SubjectType::Invoice, None));
    assert!(ability.cannot(Action::Update, SubjectType::User, None));
}

#[test]
fn draft_and_private_content_is_not_public() {
    let ability = RuleCompiler::default().ability_for(&ViewerContext::anonymous("US"));
    let draft = SubjectAttributes {
        state: Some(ResourceState::Draft.as_str().to_owned()),
        ..published_content("post-1")
    };
    let private = SubjectAttributes {
        visibility: Some(Visibility::Private.as_str().to_owned()),
        ..published_content("post-1")
    };
    let in_review = SubjectAttributes {
        state: Some(ResourceState::Review.as_str().to_owned()),
        ..published_content("post-1")
    };

    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&draft)));
    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&private)));
    assert!(ability.can(Action::Read, SubjectType::Content, Some(&in_review)));
}

#[test]
fn restricted_purchase_from_another_country_is_region_gated() {
    let context = ViewerContext {
        purchases: vec![Purchase {
            country: Some("IN".to_owned()),
            ..Purchase::with_status(PurchaseStatus::Restricted)
        }],
        ..signed_in(user("user-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::RegionRestriction, None));
    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("lesson-1"))));
}

#[test]
fn restricted_purchase_in_its_own_country_grants_content() {
    let context = ViewerContext {
        country: "IN".to_owned(),
        purchases: vec![Purchase {
            country: Some("IN".to_owned()),
            ..Purchase::with_status(PurchaseStatus::Restricted)
        }],
        ..signed_in(user("user-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, Some(&content("lesson-1"))));
    assert!(ability.cannot(Action::Read, SubjectType::RegionRestriction, None));
}

#[test]
fn subscription_entitlement_grants_content_and_discord() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![subscription_entitlement(Some(Duration::days(1)))];
    let context = ViewerContext {
        entitlement_types: vec![subscription_access_type()],
        ..signed_in(viewer)
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, Some(&content("any"))));
    assert!(ability.can(Action::Read, SubjectType::Content, None));
    assert!(ability.can(Action::Read, SubjectType::Discord, None));
}

#[test]
fn expired_entitlement_grants_nothing() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![subscription_entitlement(Some(Duration::days(-1)))];
    let context = ViewerContext {
        entitlement_types: vec![subscription_access_type()],
        ..signed_in(viewer)
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("any"))));
    assert!(ability.cannot(Action::Read, SubjectType::Discord, None));
}

#[test]
fn compile_at_uses_the_given_clock() {
    let now = Utc::now();
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![Entitlement {
        expires: Some(now + Duration::hours(1)),
        ..subscription_entitlement(None)
    }];
    let context = ViewerContext {
        entitlement_types: vec![subscription_access_type()],
        ..signed_in(viewer)
    };
    let compiler = RuleCompiler::default();

    let before = compiler.compile_at(&context, now);
    let after = compiler.compile_at(&context, now + Duration::hours(2));

    assert!(before.allows(Action::Read, SubjectType::Content, None));
    assert!(!after.allows(Action::Read, SubjectType::Content, None));
}

#[test]
fn unconfigured_entitlement_type_grants_nothing() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![subscription_entitlement(None)];
    let context = ViewerContext {
        entitlement_types: vec![EntitlementType {
            id: "et-1".to_owned(),
            name: "workshop_access".to_owned(),
        }],
        ..signed_in(viewer)
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("any"))));
    assert!(ability.cannot(Action::Read, SubjectType::Discord, None));
}

#[test]
fn discord_access_follows_its_own_configuration() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![subscription_entitlement(None)];
    let context = ViewerContext {
        entitlement_types: vec![subscription_access_type()],
        ..signed_in(viewer)
    };
    let compiler = RuleCompiler::new(AccessPolicyConfig::new(
        ["subscription_access"],
        Vec::<String>::new(),
        false,
    ));

    let ability = compiler.ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, None));
    assert!(ability.cannot(Action::Read, SubjectType::Discord, None));
}

#[test]
fn discord_needs_a_subscription_entitlement() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![Entitlement {
        entitlement_type: "workshop_access".to_owned(),
        ..subscription_entitlement(None)
    }];
    let compiler = RuleCompiler::new(AccessPolicyConfig::new(
        ["subscription_access"],
        ["workshop_access"],
        false,
    ));

    let ability = compiler.ability_for(&signed_in(viewer));

    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("any"))));
    assert!(ability.cannot(Action::Read, SubjectType::Discord, None));
}

#[test]
fn content_scoped_entitlement_grants_only_listed_content() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![Entitlement {
        entitlement_type: "et-9".to_owned(),
        expires: None,
        metadata: json!({ "contentIds": ["workshop-123"] }),
    }];

    let ability = RuleCompiler::default().ability_for(&signed_in(viewer));

    assert!(ability.can(
        Action::Read,
        SubjectType::Content,
        Some(&content("workshop-123"))
    ));
    assert!(ability.cannot(
        Action::Read,
        SubjectType::Content,
        Some(&content("workshop-999"))
    ));
    assert!(ability.cannot(Action::Read, SubjectType::Content, None));
}

#[test]
fn malformed_entitlement_is_skipped() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![
        Entitlement {
            entitlement_type: "et-9".to_owned(),
            expires: None,
            metadata: json!({ "contentIds": "workshop-123" }),
        },
        subscription_entitlement(None),
    ];
    let context = ViewerContext {
        entitlement_types: vec![subscription_access_type()],
        ..signed_in(viewer)
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, Some(&content("any"))));
}

#[test]
fn admin_can_do_everything() {
    let ability = RuleCompiler::default().ability_for(&signed_in(user("admin-1", &["ADMIN"])));

    for action in Action::all() {
        for subject in [
            SubjectType::Content,
            SubjectType::User,
            SubjectType::Invoice,
            SubjectType::Team,
            SubjectType::Discord,
            SubjectType::RegionRestriction,
        ] {
            assert!(ability.can(*action, subject, None));
            assert!(ability.can(*action, subject, Some(&content("anything"))));
        }
    }
}

#[test]
fn contributor_manages_only_own_content() {
    let ability = RuleCompiler::default().ability_for(&signed_in(user("author-1", &["contributor"])));
    let own = SubjectAttributes {
        created_by_id: Some("author-1".to_owned()),
        ..content("post-1")
    };
    let foreign = SubjectAttributes {
        created_by_id: Some("author-2".to_owned()),
        ..content("post-2")
    };

    assert!(ability.can(Action::Create, SubjectType::Content, None));
    assert!(ability.can(Action::Update, SubjectType::Content, Some(&own)));
    assert!(ability.can(Action::Delete, SubjectType::Content, Some(&own)));
    assert!(ability.cannot(Action::Update, SubjectType::Content, Some(&foreign)));
}

#[test]
fn users_manage_only_themselves() {
    let ability = RuleCompiler::default().ability_for(&signed_in(user("user-1", &[])));

    assert!(ability.can(Action::Read, SubjectType::User, Some(&content("user-1"))));
    assert!(ability.can(Action::Update, SubjectType::User, Some(&content("user-1"))));
    assert!(ability.cannot(Action::Update, SubjectType::User, Some(&content("user-2"))));
    assert!(ability.cannot(Action::Delete, SubjectType::User, Some(&content("user-1"))));
}

#[test]
fn only_the_first_lesson_of_a_module_is_free() {
    let workshop = workshop_with_lessons(&["lesson-1", "lesson-2"]);
    let first = ViewerContext {
        module: Some(workshop.clone()),
        resource: Some(ResourceContext::new(
            resource_id("lesson-1"),
            ResourceType::Lesson,
        )),
        ..ViewerContext::anonymous("US")
    };
    let second = ViewerContext {
        resource: Some(ResourceContext::new(
            resource_id("lesson-2"),
            ResourceType::Lesson,
        )),
        ..first.clone()
    };
    let compiler = RuleCompiler::default();

    assert!(compiler.ability_for(&first).can(Action::Read, SubjectType::Content, None));
    assert!(compiler.ability_for(&second).cannot(Action::Read, SubjectType::Content, None));
}

#[test]
fn solution_view_is_never_free() {
    let context = ViewerContext {
        module: Some(workshop_with_lessons(&["lesson-1"])),
        resource: Some(ResourceContext::new(
            resource_id("lesson-1"),
            ResourceType::Lesson,
        )),
        is_solution: true,
        ..ViewerContext::anonymous("US")
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.cannot(Action::Read, SubjectType::Content, None));
}

#[test]
fn tutorial_needs_identity_unless_email_is_optional() {
    let context = ViewerContext {
        resource: Some(ResourceContext::new(
            resource_id("tutorial-1"),
            ResourceType::Tutorial,
        )),
        ..ViewerContext::anonymous("US")
    };
    let with_identity = ViewerContext {
        user: Some(user("user-1", &[])),
        ..context.clone()
    };
    let open = RuleCompiler::new(AccessPolicyConfig {
        email_not_required: true,
        ..AccessPolicyConfig::default()
    });

    assert!(
        RuleCompiler::default()
            .ability_for(&context)
            .cannot(Action::Read, SubjectType::Content, None)
    );
    assert!(
        RuleCompiler::default()
            .ability_for(&with_identity)
            .can(Action::Read, SubjectType::Content, None)
    );
    assert!(open.ability_for(&context).can(Action::Read, SubjectType::Content, None));
}

#[test]
fn bulk_purchase_grants_team_management_not_content() {
    let context = ViewerContext {
        purchases: vec![Purchase {
            merchant_charge_id: Some("ch_1".to_owned()),
            bulk_coupon: Some(BulkCoupon {
                id: "coupon-1".to_owned(),
                max_uses: 5,
                used_count: 2,
            }),
            ..Purchase::with_status(PurchaseStatus::Valid)
        }],
        ..signed_in(user("buyer-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Invoice, None));
    assert!(ability.can(Action::Read, SubjectType::Team, None));
    assert!(ability.can(Action::Invite, SubjectType::Team, None));
    assert!(ability.cannot(Action::Read, SubjectType::Content, Some(&content("lesson-1"))));
}

#[test]
fn full_bulk_coupon_cannot_invite() {
    let context = ViewerContext {
        purchases: vec![Purchase {
            bulk_coupon: Some(BulkCoupon {
                id: "coupon-1".to_owned(),
                max_uses: 5,
                used_count: 5,
            }),
            ..Purchase::with_status(PurchaseStatus::Valid)
        }],
        ..signed_in(user("buyer-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Team, None));
    assert!(ability.cannot(Action::Invite, SubjectType::Team, None));
}

#[test]
fn team_subscription_owner_can_invite_while_seats_remain() {
    let context = ViewerContext {
        team_subscriptions: vec![
            TeamSubscription {
                subscription_id: "sub-1".to_owned(),
                total_seats: 5,
                used_seats: 4,
            },
            TeamSubscription {
                subscription_id: "broken".to_owned(),
                total_seats: 0,
                used_seats: 0,
            },
        ],
        ..signed_in(user("owner-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Team, None));
    assert!(ability.can(Action::Invite, SubjectType::Team, None));
}

#[test]
fn malformed_purchase_is_skipped() {
    let context = ViewerContext {
        purchases: vec![
            Purchase::with_status(PurchaseStatus::Restricted),
            Purchase {
                merchant_charge_id: Some("ch_2".to_owned()),
                ..Purchase::with_status(PurchaseStatus::Valid)
            },
        ],
        ..signed_in(user("user-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, Some(&content("lesson-1"))));
    assert!(ability.can(Action::Read, SubjectType::Invoice, None));
    assert!(ability.cannot(Action::Read, SubjectType::RegionRestriction, None));
}

#[test]
fn compiled_rules_are_serializable() {
    let rules = RuleCompiler::default().compile(&signed_in(user("user-1", &[])));
    let encoded = serde_json::to_value(&rules);

    assert!(encoded.is_ok());
    let encoded = encoded.unwrap_or_default();
    assert!(
        encoded
            .as_array()
            .is_some_and(|rules| rules.iter().any(|rule| rule["subject"] == "User"))
    );
}

#[test]
fn anonymous_viewer_reads_a_free_tip() {
    let context = ViewerContext {
        resource: Some(ResourceContext::new(resource_id("tip-1"), ResourceType::Tip)),
        ..ViewerContext::anonymous("US")
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, None));
}

#[test]
fn subscription_entitlement_matched_by_raw_type_name() {
    let mut viewer = user("user-1", &[]);
    viewer.entitlements = vec![Entitlement {
        entitlement_type: "subscription_access".to_owned(),
        expires: None,
        metadata: json!(null),
    }];
    let mut module = workshop_with_lessons(&["lesson-1"]);
    module.resource_products = vec!["product-1".to_owned()];
    let context = ViewerContext {
        module: Some(module),
        ..signed_in(viewer)
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.can(Action::Read, SubjectType::Content, None));
    assert!(ability.can(Action::Read, SubjectType::Discord, None));
}

#[test]
fn module_purchase_of_another_product_grants_nothing() {
    let mut module = workshop_with_lessons(&["lesson-1", "lesson-2"]);
    module.resource_products = vec!["product-1".to_owned()];
    let context = ViewerContext {
        module: Some(module),
        resource: Some(ResourceContext::new(
            resource_id("lesson-2"),
            ResourceType::Lesson,
        )),
        purchases: vec![Purchase {
            product_id: Some("product-2".to_owned()),
            ..Purchase::with_status(PurchaseStatus::Valid)
        }],
        ..signed_in(user("user-1", &[]))
    };

    let ability = RuleCompiler::default().ability_for(&context);

    assert!(ability.cannot(Action::Read, SubjectType::Content, None));
}
