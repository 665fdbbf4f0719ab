use lectern_application::decode_records;
use lectern_core::AppError;
use lectern_domain::{
    ResourceContext, ResourceId, Role, RuleSet, SubjectAttributes, Subscriber, UserId,
    ViewerContext, ViewerUser,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Signed-in user facts. Entitlements are decoded one by one.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/viewer-user-request.ts"
)]
pub struct ViewerUserRequest {
    pub id: String,
    #[serde(default)]
    #[ts(type = "Array<{ name: string, metadata?: unknown }>")]
    pub roles: Vec<Role>,
    #[serde(default)]
    #[ts(type = "Array<unknown>")]
    pub entitlements: Vec<Value>,
}

/// Viewer facts as sent by collaborators.
///
/// Record lists stay untyped until conversion so a single malformed record
/// is dropped instead of failing the whole request.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/viewer-context-request.ts"
)]
pub struct ViewerContextRequest {
    #[serde(default)]
    pub user: Option<ViewerUserRequest>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    #[ts(type = "Array<unknown>")]
    pub entitlement_types: Vec<Value>,
    #[serde(default)]
    #[ts(type = "Array<unknown>")]
    pub purchases: Vec<Value>,
    #[serde(default)]
    #[ts(type = "{ id?: string, email?: string } | null")]
    pub subscriber: Option<Subscriber>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub module: Option<ResourceContext>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub section: Option<ResourceContext>,
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub resource: Option<ResourceContext>,
    #[serde(default)]
    pub is_solution: bool,
    #[serde(default)]
    pub all_module_resource_ids: Vec<String>,
    #[serde(default)]
    #[ts(type = "Array<unknown>")]
    pub team_subscriptions: Vec<Value>,
}

impl TryFrom<ViewerUserRequest> for ViewerUser {
    type Error = AppError;

    fn try_from(value: ViewerUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(value.id)?,
            roles: value.roles,
            entitlements: decode_records("entitlement", value.entitlements),
        })
    }
}

impl TryFrom<ViewerContextRequest> for ViewerContext {
    type Error = AppError;

    fn try_from(value: ViewerContextRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            user: value.user.map(ViewerUser::try_from).transpose()?,
            country: value.country,
            entitlement_types: decode_records("entitlement type", value.entitlement_types),
            purchases: decode_records("purchase", value.purchases),
            subscriber: value.subscriber,
            module: value.module,
            section: value.section,
            resource: value.resource,
            is_solution: value.is_solution,
            all_module_resource_ids: value
                .all_module_resource_ids
                .into_iter()
                .map(ResourceId::new)
                .collect::<Result<Vec<_>, _>>()?,
            team_subscriptions: decode_records("team subscription", value.team_subscriptions),
        })
    }
}

/// Incoming payload for rule compilation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ability-request.ts"
)]
pub struct AbilityRequest {
    pub context: ViewerContextRequest,
}

/// Compiled rules in the client rule format.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ability-response.ts"
)]
pub struct AbilityResponse {
    #[ts(type = "Array<{ actions: Array<string>, subject: string, conditions?: Record<string, unknown> }>")]
    pub rules: RuleSet,
}

/// Incoming payload for a single permission check.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ability-check-request.ts"
)]
pub struct AbilityCheckRequest {
    pub context: ViewerContextRequest,
    pub action: String,
    pub subject: String,
    #[serde(default)]
    #[ts(type = "Record<string, string> | null")]
    pub instance: Option<SubjectAttributes>,
    /// Checks against the attributes of `context.resource` when no instance is given.
    #[serde(default)]
    pub check_resource: bool,
}

/// Permission check result.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/ability-check-response.ts"
)]
pub struct AbilityCheckResponse {
    pub allowed: bool,
}
