//! Per-field rules. Each rule checks one JSON value and returns it coerced.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

use super::messages::{Label, Violation, MAX_INTEGER, MIN_INTEGER};
use crate::database::models::{status, PRODUCT_CATEGORIES, USER_FEATURES};

const INVISIBLE: &str = r"\s|\p{C}|\x{2800}|\x{034f}|\x{115f}|\x{1160}|\x{17b4}|\x{17b5}|\x{3164}|\x{ffa0}";

static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\x{00C0}-\x{017F} ]+$").expect("valid username regex"));
static LEADING_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^({})", INVISIBLE)).expect("valid leading regex"));
static TRAILING_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("({})+$", INVISIBLE)).expect("valid trailing regex"));

const PRICE_MAX: f64 = 99_999_999.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Username,
    Password,
    SessionId,
    Name,
    Integer,
    Price,
    Picture,
    OneOf(&'static [&'static str]),
    /// Array of values from a fixed set
    EnumList {
        valid: &'static [&'static str],
        min: usize,
    },
    /// Array of positive integers
    IdList {
        unique: bool,
    },
    OrderId,
    Observation,
    AdditionalIngredients,
}

/// Every field name with a registered rule
pub const FIELDS: &[&str] = &[
    "additional_ingredients",
    "category",
    "category_id",
    "category_status",
    "features",
    "id",
    "ingredients_ids",
    "name",
    "observation",
    "order_id",
    "order_status",
    "password",
    "picture",
    "price",
    "product_id",
    "product_status",
    "removed_ingredients",
    "session_id",
    "table_number",
    "username",
    "value",
];

/// Rule registered for a field name
pub fn lookup(field: &str) -> Option<Rule> {
    let rule = match field {
        "username" => Rule::Username,
        "password" => Rule::Password,
        "session_id" => Rule::SessionId,
        "name" => Rule::Name,
        "id" | "category_id" | "product_id" | "table_number" | "value" => Rule::Integer,
        "price" => Rule::Price,
        "picture" => Rule::Picture,
        "category" => Rule::OneOf(PRODUCT_CATEGORIES),
        "ingredients_ids" => Rule::IdList { unique: false },
        "removed_ingredients" => Rule::IdList { unique: true },
        "category_status" => Rule::EnumList {
            valid: status::CATEGORY,
            min: 1,
        },
        "product_status" => Rule::EnumList {
            valid: status::PRODUCT,
            min: 1,
        },
        "order_status" => Rule::EnumList {
            valid: status::ORDER,
            min: 1,
        },
        "features" => Rule::EnumList {
            valid: USER_FEATURES,
            min: 0,
        },
        "order_id" => Rule::OrderId,
        "observation" => Rule::Observation,
        "additional_ingredients" => Rule::AdditionalIngredients,
        _ => return None,
    };
    Some(rule)
}

impl Rule {
    pub fn apply(self, label: &Label, value: &Value) -> Result<Value, Violation> {
        match self {
            Rule::Username => {
                let s = string(label, value)?.trim();
                non_empty(label, s)?;
                if !USERNAME.is_match(s) {
                    return Err(Violation::pattern(label));
                }
                max_chars(label, s, 30)?;
                Ok(Value::String(s.to_string()))
            }
            Rule::Password => {
                let s = string(label, value)?.trim();
                non_empty(label, s)?;
                min_chars(label, s, 8)?;
                max_chars(label, s, 72)?;
                Ok(Value::String(s.to_string()))
            }
            Rule::SessionId => {
                let s = string(label, value)?;
                non_empty(label, s)?;
                if s.chars().count() != 96 {
                    return Err(Violation::string_length(label, 96));
                }
                if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(Violation::string_alphanum(label));
                }
                Ok(Value::String(s.to_string()))
            }
            Rule::Name => {
                let s = strip_trailing_invisible(string(label, value)?);
                non_empty(label, &s)?;
                if LEADING_INVISIBLE.is_match(&s) {
                    return Err(Violation::pattern_invert(label));
                }
                max_chars(label, &s, 128)?;
                Ok(Value::String(s))
            }
            Rule::Integer => integer(label, value).map(Value::from),
            Rule::Price => {
                let price = decimal(label, value, || Violation::number_min(label, "0"))?;
                Ok(Value::String(round_price(price).to_string()))
            }
            Rule::Picture => {
                let s = string(label, value)?;
                non_empty(label, s)?;
                let parsed = url::Url::parse(s).map_err(|_| Violation::uri(label))?;
                if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                    return Err(Violation::uri(label));
                }
                Ok(Value::String(s.to_string()))
            }
            Rule::OneOf(valid) => one_of(label, value, valid),
            Rule::EnumList { valid, min } => {
                let items = array(label, value)?;
                let cleaned = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| one_of(&label.item(i), item, valid))
                    .collect::<Result<Vec<_>, _>>()?;
                if cleaned.len() < min {
                    return Err(Violation::array_min(label, min));
                }
                Ok(Value::Array(cleaned))
            }
            Rule::IdList { unique } => {
                let items = array(label, value)?;
                let mut ids: Vec<i64> = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_label = label.item(i);
                    let id = positive_integer(&item_label, item)?;
                    if unique && ids.contains(&id) {
                        return Err(Violation::array_unique(&item_label));
                    }
                    ids.push(id);
                }
                Ok(Value::from(ids))
            }
            Rule::OrderId => {
                let s = string(label, value)?.trim();
                non_empty(label, s)?;
                max_chars(label, s, 64)?;
                Ok(Value::String(s.to_string()))
            }
            Rule::Observation => {
                let s = strip_trailing_invisible(string(label, value)?);
                max_chars(label, &s, 160)?;
                Ok(Value::String(s))
            }
            Rule::AdditionalIngredients => {
                let items = array(label, value)?;
                let cleaned = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| additional_ingredient(&label.item(i), item))
                    .collect::<Result<Vec<_>, _>>()?;
                if cleaned.is_empty() {
                    return Err(Violation::array_min(label, 1));
                }
                Ok(Value::Array(cleaned))
            }
        }
    }
}

fn additional_ingredient(label: &Label, value: &Value) -> Result<Value, Violation> {
    let obj = value.as_object().ok_or_else(|| Violation::object_base(label))?;
    let mut cleaned = Map::new();

    for field in ["ingredient_id", "multiplied"] {
        let child = label.child(field);
        let raw = obj.get(field).ok_or_else(|| Violation::required(&child))?;
        cleaned.insert(field.to_string(), Value::from(positive_integer(&child, raw)?));
    }

    let child = label.child("price");
    let raw = obj.get("price").ok_or_else(|| Violation::required(&child))?;
    let price = decimal(&child, raw, || Violation::number_positive(&child))?;
    if price <= Decimal::ZERO {
        return Err(Violation::number_positive(&child));
    }
    cleaned.insert("price".to_string(), Value::String(round_price(price).to_string()));

    Ok(Value::Object(cleaned))
}

fn string<'a>(label: &Label, value: &'a Value) -> Result<&'a str, Violation> {
    value.as_str().ok_or_else(|| Violation::string_base(label))
}

fn non_empty(label: &Label, s: &str) -> Result<(), Violation> {
    if s.is_empty() {
        return Err(Violation::string_empty(label));
    }
    Ok(())
}

fn min_chars(label: &Label, s: &str, limit: usize) -> Result<(), Violation> {
    if s.chars().count() < limit {
        return Err(Violation::string_min(label, limit));
    }
    Ok(())
}

fn max_chars(label: &Label, s: &str, limit: usize) -> Result<(), Violation> {
    if s.chars().count() > limit {
        return Err(Violation::string_max(label, limit));
    }
    Ok(())
}

fn strip_trailing_invisible(s: &str) -> String {
    let without_nul = s.replace('\u{0000}', "");
    TRAILING_INVISIBLE.replace(&without_nul, "").into_owned()
}

fn array<'a>(label: &Label, value: &'a Value) -> Result<&'a Vec<Value>, Violation> {
    value.as_array().ok_or_else(|| Violation::array_base(label))
}

fn one_of(label: &Label, value: &Value, valid: &[&str]) -> Result<Value, Violation> {
    match value.as_str() {
        Some(s) if valid.contains(&s) => Ok(Value::String(s.to_string())),
        _ => Err(Violation::only(label, valid)),
    }
}

/// Numbers arrive as JSON numbers or, from query strings and paths, as text
fn numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn integer(label: &Label, value: &Value) -> Result<i64, Violation> {
    let n = numeric_text(value)
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .ok_or_else(|| Violation::number_base(label))?;

    if n < MIN_INTEGER as f64 || n > MAX_INTEGER as f64 {
        return Err(Violation::number_unsafe(label));
    }
    if n.fract() != 0.0 {
        return Err(Violation::number_integer(label));
    }
    Ok(n as i64)
}

fn positive_integer(label: &Label, value: &Value) -> Result<i64, Violation> {
    let n = integer(label, value)?;
    if n <= 0 {
        return Err(Violation::number_positive(label));
    }
    Ok(n)
}

/// Bounds are checked on the float reading so values outside `Decimal`'s range
/// still report the broken limit rather than `number.base`
fn decimal(
    label: &Label,
    value: &Value,
    below_zero: impl FnOnce() -> Violation,
) -> Result<Decimal, Violation> {
    let text = numeric_text(value).ok_or_else(|| Violation::number_base(label))?;
    let as_float = text
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Violation::number_base(label))?;

    if as_float < 0.0 {
        return Err(below_zero());
    }
    if as_float > PRICE_MAX {
        return Err(Violation::number_max(label, "99999999.99"));
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| Violation::number_base(label))
}

fn round_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
