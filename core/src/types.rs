//! Typed request payloads for every resource.
//!
//! # Design
//! Each resource gets its own create and update struct. Create structs carry
//! the required fields as plain values and skip empty optional fields on
//! serialization. Update structs are all-`Option` and skip `None`, so every
//! resource sends a partial update containing only the supplied fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::{Operation, Resource};

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenOperationType {
    #[default]
    Transfer,
    Mint,
    Burn,
    Approve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenOperationStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOperationCreate {
    pub token_address: String,
    pub amount: String,
    pub operation_type: TokenOperationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_address: Option<String>,
}

/// The `updateFields` collection of a token operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOperationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TokenOperationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagementStrategy {
    #[default]
    Active,
    Passive,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundCreate {
    pub fund_name: String,
    pub management_strategy: ManagementStrategy,
    pub target_allocation: f64,
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_strategy: Option<ManagementStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_allocation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<RiskProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCreate {
    pub token_symbol: String,
    pub price: f64,
    pub nav: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Redemption,
    #[default]
    Subscription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreate {
    pub fund_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: String,
    pub investor_address: String,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LendingCreate {
    pub asset: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<String>,
    /// Duration of the position; zero means "not set" and is not sent.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LendingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: u64,
}

/// Body of a create request, one variant per resource.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatePayload {
    TokenOperation(TokenOperationCreate),
    Fund(FundCreate),
    /// Market records are free-form JSON objects.
    Market(Map<String, Value>),
    Pricing(PricingCreate),
    Transaction(TransactionCreate),
    Lending(LendingCreate),
}

/// Body of an update request, one variant per resource.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    TokenOperation(TokenOperationUpdate),
    Fund(FundUpdate),
    Market(Map<String, Value>),
    Pricing(PricingUpdate),
    Transaction(TransactionUpdate),
    Lending(LendingUpdate),
}

macro_rules! payload_impl {
    ($payload:ident) => {
        impl $payload {
            pub fn resource(&self) -> Resource {
                match self {
                    $payload::TokenOperation(_) => Resource::UsdyTokenOperations,
                    $payload::Fund(_) => Resource::OusgFundManagement,
                    $payload::Market(_) => Resource::OndoGlobalMarkets,
                    $payload::Pricing(_) => Resource::TokenPricingAndNav,
                    $payload::Transaction(_) => Resource::RedemptionsAndSubscriptions,
                    $payload::Lending(_) => Resource::FluxFinanceLending,
                }
            }

            pub fn to_json(&self) -> Result<Value, serde_json::Error> {
                match self {
                    $payload::TokenOperation(body) => serde_json::to_value(body),
                    $payload::Fund(body) => serde_json::to_value(body),
                    $payload::Market(body) => Ok(Value::Object(body.clone())),
                    $payload::Pricing(body) => serde_json::to_value(body),
                    $payload::Transaction(body) => serde_json::to_value(body),
                    $payload::Lending(body) => serde_json::to_value(body),
                }
            }
        }
    };
}

payload_impl!(CreatePayload);
payload_impl!(UpdatePayload);

/// Page window for `getAll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn first(resource: Resource) -> Self {
        Self {
            limit: resource.default_limit(),
            offset: 0,
        }
    }
}

/// A fully resolved operation, ready to be turned into an HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(CreatePayload),
    Get { id: String },
    GetAll(Page),
    Update { id: String, payload: UpdatePayload },
    Delete { id: String },
}

impl Action {
    pub fn operation(&self) -> Operation {
        match self {
            Action::Create(_) => Operation::Create,
            Action::Get { .. } => Operation::Get,
            Action::GetAll(_) => Operation::GetAll,
            Action::Update { .. } => Operation::Update,
            Action::Delete { .. } => Operation::Delete,
        }
    }
}

/// Resource plus resolved action for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub resource: Resource,
    pub action: Action,
}

impl OperationRequest {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    pub fn operation(&self) -> Operation {
        self.action.operation()
    }
}
