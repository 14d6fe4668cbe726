use ltp_core::prices::{BatchResult, PairPrice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, Debug, Clone, Default)]
#[into_params(parameter_in = Query)]
pub struct LtpQuery {
    /// Comma-separated pairs, e.g. `BTC/USD,BTC/EUR`. Defaults to USD, EUR and CHF.
    pub pairs: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct PairAmount {
    pub pair: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

impl From<&PairPrice> for PairAmount {
    fn from(p: &PairPrice) -> Self {
        Self {
            pair: p.pair.to_string(),
            amount: p.amount,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LtpResponse {
    pub ltp: Vec<PairAmount>,
}

impl From<&BatchResult> for LtpResponse {
    fn from(result: &BatchResult) -> Self {
        Self {
            ltp: result.successes.iter().map(PairAmount::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ReadinessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadinessResponse {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
            error: None,
        }
    }

    pub fn not_ready(error: &str) -> Self {
        Self {
            status: "not ready".to_string(),
            error: Some(error.to_string()),
        }
    }
}
