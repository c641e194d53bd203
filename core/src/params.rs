//! Parameter resolution.
//!
//! # Design
//! The host hands parameters out by name and item index, and a value may
//! differ from one item to the next. `ParameterSource` is that boundary.
//! `ParameterResolver` reads the fields a (resource, operation) pair needs
//! for one item, applies defaults, and produces a typed `OperationRequest`.
//! Empty strings and `null` count as "not supplied" everywhere.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::resource::{Operation, Resource};
use crate::types::{
    Action, CreatePayload, FundCreate, FundUpdate, LendingCreate, LendingUpdate, OperationRequest,
    Page, PricingCreate, PricingUpdate, TokenOperationCreate, TokenOperationUpdate,
    TransactionCreate, TransactionUpdate, UpdatePayload,
};

/// Host-side per-item parameter lookup.
pub trait ParameterSource {
    /// Value of `name` for input item `item`, or `None` when unset.
    fn parameter(&self, name: &str, item: usize) -> Option<Value>;
}

/// Parameters held as JSON: node-level values shared by every item, plus
/// optional per-item overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonParameters {
    shared: Map<String, Value>,
    items: Vec<Map<String, Value>>,
}

impl JsonParameters {
    pub fn new(shared: Map<String, Value>) -> Self {
        Self {
            shared,
            items: Vec::new(),
        }
    }

    /// Append overrides for the next item index.
    pub fn with_item(mut self, overrides: Map<String, Value>) -> Self {
        self.items.push(overrides);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.shared.insert(name.into(), value);
    }
}

impl From<Map<String, Value>> for JsonParameters {
    fn from(shared: Map<String, Value>) -> Self {
        Self::new(shared)
    }
}

impl TryFrom<Value> for JsonParameters {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(ApiError::InvalidParameter {
                name: "parameters".to_string(),
                item: 0,
                reason: format!("expected a JSON object, got {}", type_name(&other)),
            }),
        }
    }
}

impl ParameterSource for JsonParameters {
    fn parameter(&self, name: &str, item: usize) -> Option<Value> {
        self.items
            .get(item)
            .and_then(|overrides| overrides.get(name))
            .or_else(|| self.shared.get(name))
            .cloned()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reads typed fields for a single item.
pub struct ParameterResolver<'a, S: ParameterSource + ?Sized> {
    source: &'a S,
    item: usize,
}

impl<'a, S: ParameterSource + ?Sized> ParameterResolver<'a, S> {
    pub fn new(source: &'a S, item: usize) -> Self {
        Self { source, item }
    }

    pub fn item(&self) -> usize {
        self.item
    }

    /// The `resource` parameter.
    pub fn resource(&self) -> Result<Resource, ApiError> {
        self.required_string("resource")?.parse()
    }

    /// The `operation` parameter.
    pub fn operation(&self) -> Result<Operation, ApiError> {
        self.required_string("operation")?.parse()
    }

    /// Resolve every field `operation` needs on `resource`.
    pub fn resolve(
        &self,
        resource: Resource,
        operation: Operation,
    ) -> Result<OperationRequest, ApiError> {
        let action = match operation {
            Operation::Create => Action::Create(self.create_payload(resource)?),
            Operation::Get => Action::Get { id: self.id()? },
            Operation::GetAll => Action::GetAll(self.page(resource)?),
            Operation::Update => Action::Update {
                id: self.id()?,
                payload: self.update_payload(resource)?,
            },
            Operation::Delete => Action::Delete { id: self.id()? },
        };
        Ok(OperationRequest::new(resource, action))
    }

    fn id(&self) -> Result<String, ApiError> {
        self.required_string("id")
    }

    fn page(&self, resource: Resource) -> Result<Page, ApiError> {
        Ok(Page {
            limit: self
                .unsigned("limit")?
                .unwrap_or_else(|| resource.default_limit()),
            offset: self.unsigned("offset")?.unwrap_or(0),
        })
    }

    fn create_payload(&self, resource: Resource) -> Result<CreatePayload, ApiError> {
        let payload = match resource {
            Resource::UsdyTokenOperations => CreatePayload::TokenOperation(TokenOperationCreate {
                token_address: self.required_string("tokenAddress")?,
                amount: self.required_string("amount")?,
                operation_type: self.choice("operationType")?.unwrap_or_default(),
                recipient_address: self.string("recipientAddress")?,
            }),
            Resource::OusgFundManagement => CreatePayload::Fund(FundCreate {
                fund_name: self.required_string("fundName")?,
                management_strategy: self.choice("managementStrategy")?.unwrap_or_default(),
                target_allocation: self.number("targetAllocation")?.unwrap_or(100.0),
                risk_profile: self.choice("riskProfile")?.unwrap_or_default(),
            }),
            Resource::OndoGlobalMarkets => {
                CreatePayload::Market(self.object("data")?.unwrap_or_default())
            }
            Resource::TokenPricingAndNav => CreatePayload::Pricing(PricingCreate {
                token_symbol: self.required_string("tokenSymbol")?,
                price: self.number("price")?.unwrap_or(0.0),
                nav: self.number("nav")?.unwrap_or(0.0),
                currency: self
                    .string("currency")?
                    .unwrap_or_else(|| "USD".to_string()),
                timestamp: self.string("timestamp")?,
            }),
            Resource::RedemptionsAndSubscriptions => {
                CreatePayload::Transaction(TransactionCreate {
                    fund_id: self.required_string("fundId")?,
                    kind: self.choice("type")?.unwrap_or_default(),
                    amount: self.required_string("amount")?,
                    investor_address: self.required_string("investorAddress")?,
                    status: self.choice("status")?.unwrap_or_default(),
                })
            }
            Resource::FluxFinanceLending => CreatePayload::Lending(LendingCreate {
                asset: self.required_string("asset")?,
                amount: self.required_string("amount")?,
                interest_rate: self.string("interestRate")?,
                duration: self.unsigned("duration")?.unwrap_or(0),
            }),
        };
        Ok(payload)
    }

    fn update_payload(&self, resource: Resource) -> Result<UpdatePayload, ApiError> {
        let payload = match resource {
            Resource::UsdyTokenOperations => {
                UpdatePayload::TokenOperation(self.update_fields("updateFields")?)
            }
            Resource::OusgFundManagement => UpdatePayload::Fund(FundUpdate {
                management_strategy: self.choice("managementStrategy")?,
                target_allocation: self.number("targetAllocation")?,
                risk_profile: self.choice("riskProfile")?,
            }),
            Resource::OndoGlobalMarkets => {
                UpdatePayload::Market(self.object("data")?.unwrap_or_default())
            }
            Resource::TokenPricingAndNav => UpdatePayload::Pricing(PricingUpdate {
                token_symbol: self.string("tokenSymbol")?,
                price: self.number("price")?,
                nav: self.number("nav")?,
                currency: self.string("currency")?,
                timestamp: self.string("timestamp")?,
            }),
            Resource::RedemptionsAndSubscriptions => UpdatePayload::Transaction(TransactionUpdate {
                kind: self.choice("type")?,
                amount: self.string("amount")?,
                investor_address: self.string("investorAddress")?,
                status: self.choice("status")?,
            }),
            Resource::FluxFinanceLending => UpdatePayload::Lending(LendingUpdate {
                amount: self.string("amount")?,
                interest_rate: self.string("interestRate")?,
                duration: self.unsigned("duration")?.unwrap_or(0),
            }),
        };
        Ok(payload)
    }

    fn raw(&self, name: &str) -> Option<Value> {
        match self.source.parameter(name, self.item) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> ApiError {
        ApiError::InvalidParameter {
            name: name.to_string(),
            item: self.item,
            reason: reason.into(),
        }
    }

    fn string(&self, name: &str) -> Result<Option<String>, ApiError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a string, got {}", type_name(&other)),
            )),
        }
    }

    fn required_string(&self, name: &str) -> Result<String, ApiError> {
        self.string(name)?.ok_or_else(|| ApiError::MissingParameter {
            name: name.to_string(),
            item: self.item,
        })
    }

    fn number(&self, name: &str) -> Result<Option<f64>, ApiError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(name, "number out of range")),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| self.invalid(name, format!("\"{s}\" is not a number"))),
            Some(other) => Err(self.invalid(
                name,
                format!("expected a number, got {}", type_name(&other)),
            )),
        }
    }

    fn unsigned(&self, name: &str) -> Result<Option<u64>, ApiError> {
        let Some(value) = self.number(name)? else {
            return Ok(None);
        };
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(self.invalid(name, format!("expected a non-negative integer, got {value}")));
        }
        Ok(Some(value as u64))
    }

    fn choice<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        let Some(value) = self.string(name)? else {
            return Ok(None);
        };
        serde_json::from_value(Value::String(value.clone()))
            .map(Some)
            .map_err(|_| self.invalid(name, format!("unsupported value \"{value}\"")))
    }

    fn object(&self, name: &str) -> Result<Option<Map<String, Value>>, ApiError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Object(map)) => Ok(Some(map)),
                Ok(other) => Err(self.invalid(
                    name,
                    format!("expected a JSON object, got {}", type_name(&other)),
                )),
                Err(e) => Err(self.invalid(name, format!("invalid JSON: {e}"))),
            },
            Some(other) => Err(self.invalid(
                name,
                format!("expected a JSON object, got {}", type_name(&other)),
            )),
        }
    }

    /// A nested collection whose unset entries are dropped before it is
    /// decoded. Numbers become their decimal text, matching how top-level
    /// string parameters are read.
    fn update_fields<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, ApiError> {
        let Some(mut fields) = self.object(name)? else {
            return Ok(T::default());
        };
        fields.retain(|_, value| match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        });
        for value in fields.values_mut() {
            if let Value::Number(n) = value {
                *value = Value::String(n.to_string());
            }
        }
        serde_json::from_value(Value::Object(fields)).map_err(|e| self.invalid(name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskProfile, TokenOperationStatus, TokenOperationType, TransactionType};
    use serde_json::json;

    fn params(value: Value) -> JsonParameters {
        JsonParameters::try_from(value).unwrap()
    }

    fn resolve(value: Value, resource: Resource, operation: Operation) -> Result<Action, ApiError> {
        let source = params(value);
        ParameterResolver::new(&source, 0)
            .resolve(resource, operation)
            .map(|request| request.action)
    }

    #[test]
    fn token_create_drops_empty_recipient() {
        let action = resolve(
            json!({"tokenAddress": "0xABC", "amount": "1000", "operationType": "transfer", "recipientAddress": ""}),
            Resource::UsdyTokenOperations,
            Operation::Create,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Create(CreatePayload::TokenOperation(TokenOperationCreate {
                token_address: "0xABC".to_string(),
                amount: "1000".to_string(),
                operation_type: TokenOperationType::Transfer,
                recipient_address: None,
            }))
        );
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let err = resolve(
            json!({"amount": "1000"}),
            Resource::UsdyTokenOperations,
            Operation::Create,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::MissingParameter {
                name: "tokenAddress".to_string(),
                item: 0
            }
        );
    }

    #[test]
    fn empty_id_counts_as_missing() {
        let err = resolve(json!({"id": "  "}), Resource::OusgFundManagement, Operation::Get)
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn page_defaults_follow_the_resource() {
        let fund = resolve(json!({}), Resource::OusgFundManagement, Operation::GetAll).unwrap();
        assert_eq!(fund, Action::GetAll(Page { limit: 50, offset: 0 }));

        let lending = resolve(
            json!({"offset": 20}),
            Resource::FluxFinanceLending,
            Operation::GetAll,
        )
        .unwrap();
        assert_eq!(lending, Action::GetAll(Page { limit: 10, offset: 20 }));
    }

    #[test]
    fn negative_limit_is_invalid() {
        let err = resolve(
            json!({"limit": -5}),
            Resource::TokenPricingAndNav,
            Operation::GetAll,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { ref name, .. } if name == "limit"));
    }

    #[test]
    fn fund_create_applies_defaults() {
        let action = resolve(
            json!({"fundName": "Treasury Fund"}),
            Resource::OusgFundManagement,
            Operation::Create,
        )
        .unwrap();
        let Action::Create(CreatePayload::Fund(fund)) = action else {
            panic!("expected a fund payload");
        };
        assert_eq!(fund.target_allocation, 100.0);
        assert_eq!(fund.risk_profile, RiskProfile::Moderate);
    }

    #[test]
    fn option_values_outside_the_set_are_rejected() {
        let err = resolve(
            json!({"fundName": "F", "riskProfile": "reckless"}),
            Resource::OusgFundManagement,
            Operation::Create,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter \"riskProfile\" for item 0: unsupported value \"reckless\""
        );
    }

    #[test]
    fn token_update_accepts_a_numeric_amount() {
        let action = resolve(
            json!({"id": "op-1", "updateFields": {"amount": 500}}),
            Resource::UsdyTokenOperations,
            Operation::Update,
        )
        .unwrap();
        let Action::Update { payload, .. } = action else {
            panic!("expected an update, got {action:?}");
        };
        assert_eq!(payload.to_json().unwrap(), json!({"amount": "500"}));
    }

    #[test]
    fn token_update_reads_the_nested_collection() {
        let action = resolve(
            json!({"id": "op-1", "updateFields": {"status": "completed", "amount": "", "recipientAddress": null}}),
            Resource::UsdyTokenOperations,
            Operation::Update,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Update {
                id: "op-1".to_string(),
                payload: UpdatePayload::TokenOperation(TokenOperationUpdate {
                    amount: None,
                    status: Some(TokenOperationStatus::Completed),
                    recipient_address: None,
                }),
            }
        );
    }

    #[test]
    fn market_data_accepts_a_json_string() {
        let action = resolve(
            json!({"data": "{\"symbol\":\"OUSG\"}"}),
            Resource::OndoGlobalMarkets,
            Operation::Create,
        )
        .unwrap();
        let Action::Create(CreatePayload::Market(data)) = action else {
            panic!("expected a market payload");
        };
        assert_eq!(data.get("symbol"), Some(&json!("OUSG")));
    }

    #[test]
    fn market_data_rejects_arrays() {
        let err = resolve(json!({"data": "[1,2]"}), Resource::OndoGlobalMarkets, Operation::Create)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { .. }));
    }

    #[test]
    fn transaction_update_keeps_only_supplied_fields() {
        let action = resolve(
            json!({"id": "tx-9", "type": "redemption", "amount": ""}),
            Resource::RedemptionsAndSubscriptions,
            Operation::Update,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Update {
                id: "tx-9".to_string(),
                payload: UpdatePayload::Transaction(TransactionUpdate {
                    kind: Some(TransactionType::Redemption),
                    ..Default::default()
                }),
            }
        );
    }

    #[test]
    fn numeric_amounts_are_accepted_as_strings() {
        let action = resolve(
            json!({"asset": "USDC", "amount": 250}),
            Resource::FluxFinanceLending,
            Operation::Create,
        )
        .unwrap();
        let Action::Create(CreatePayload::Lending(lending)) = action else {
            panic!("expected a lending payload");
        };
        assert_eq!(lending.amount, "250");
        assert_eq!(lending.duration, 0);
    }

    #[test]
    fn per_item_overrides_win_over_shared_values() {
        let mut first = Map::new();
        first.insert("id".to_string(), json!("a"));
        let mut second = Map::new();
        second.insert("id".to_string(), json!("b"));
        let source = params(json!({"id": "shared"}))
            .with_item(first)
            .with_item(second);

        assert_eq!(source.parameter("id", 0), Some(json!("a")));
        assert_eq!(source.parameter("id", 1), Some(json!("b")));
        assert_eq!(source.parameter("id", 2), Some(json!("shared")));
    }

    #[test]
    fn resource_and_operation_come_from_parameters() {
        let source = params(json!({"resource": "fluxFinanceLending", "operation": "unknownOp"}));
        let resolver = ParameterResolver::new(&source, 0);
        assert_eq!(resolver.resource().unwrap(), Resource::FluxFinanceLending);
        assert_eq!(
            resolver.operation().unwrap_err(),
            ApiError::UnknownOperation("unknownOp".to_string())
        );
    }
}
