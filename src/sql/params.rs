//! Statement parameters as sqlx-bindable values.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// One bound parameter. Reports its own Postgres type; the builder casts
/// placeholders to the column type, so text-encoded dates reach `DATE` columns.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl PgBindValue {
    /// Scalars map to their own variant; arrays and objects are bound as their JSON text.
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(PgBindValue::I64)
                .unwrap_or_else(|| PgBindValue::F64(n.as_f64().unwrap_or(f64::NAN))),
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::String(v.to_string()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Null => Ok(IsNull::Yes),
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::String(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        match self {
            PgBindValue::Null | PgBindValue::String(_) => None,
            PgBindValue::Bool(_) => Some(<bool as sqlx::Type<Postgres>>::type_info()),
            PgBindValue::I64(_) => Some(<i64 as sqlx::Type<Postgres>>::type_info()),
            PgBindValue::F64(_) => Some(<f64 as sqlx::Type<Postgres>>::type_info()),
        }
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
