//! Field names and value encoding of the stock section.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Number, Value};

use stockfeed_core::SourceCode;

pub const QUANTITY: &str = "quantity";
pub const IS_IN_STOCK: &str = "is-in-stock";

const SOURCE_QUANTITY_SUFFIX: &str = "-quantity";
const SOURCE_IS_IN_STOCK_SUFFIX: &str = "-is-in-stock";

/// `"<code>-quantity"`.
pub fn source_quantity_key(code: &SourceCode) -> String {
    format!("{code}{SOURCE_QUANTITY_SUFFIX}")
}

/// `"<code>-is-in-stock"`.
pub fn source_is_in_stock_key(code: &SourceCode) -> String {
    format!("{code}{SOURCE_IS_IN_STOCK_SUFFIX}")
}

/// Integral quantities become JSON integers, others JSON floats.
pub fn quantity_value(quantity: Decimal) -> Value {
    if quantity.fract().is_zero() {
        if let Some(n) = quantity.to_i64() {
            return Value::from(n);
        }
    }
    quantity
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(quantity.to_string()))
}

/// Unlimited quantities are `null`.
pub fn optional_quantity_value(quantity: Option<Decimal>) -> Value {
    quantity.map_or(Value::Null, quantity_value)
}

pub fn flag_value(flag: bool) -> Value {
    Value::from(u8::from(flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(c: &str) -> SourceCode {
        SourceCode::new(c).unwrap()
    }

    #[test]
    fn source_keys() {
        assert_eq!(source_quantity_key(&code("eu")), "eu-quantity");
        assert_eq!(source_is_in_stock_key(&code("eu")), "eu-is-in-stock");
    }

    #[test]
    fn quantity_encoding() {
        assert_eq!(quantity_value(Decimal::new(5000, 3)), Value::from(5));
        assert_eq!(quantity_value(Decimal::from(-2)), Value::from(-2));
        assert_eq!(quantity_value(Decimal::new(25, 1)), Value::from(2.5));
        assert_eq!(optional_quantity_value(None), Value::Null);
    }

    #[test]
    fn flags_are_integers() {
        assert_eq!(flag_value(true), Value::from(1));
        assert_eq!(flag_value(false), Value::from(0));
    }
}
