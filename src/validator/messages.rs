//! Client-facing validation messages, keyed by Joi-compatible error type.

use std::fmt;

pub const MIN_INTEGER: i64 = i32::MIN as i64;
pub const MAX_INTEGER: i64 = i32::MAX as i64;

/// Where a value sits in the payload: the quoted label used in messages and
/// the `key` reported in the error body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    path: String,
    key: String,
}

impl Label {
    pub fn field(name: &str) -> Self {
        Self {
            path: name.to_string(),
            key: name.to_string(),
        }
    }

    /// Array element; reported under the `object` key
    pub fn item(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            key: "object".to_string(),
        }
    }

    /// Property of a nested object
    pub fn child(&self, name: &str) -> Self {
        Self {
            path: format!("{}.{}", self.path, name),
            key: name.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.path)
    }
}

/// First rule a value broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub error_type: &'static str,
    pub message: String,
    pub key: String,
}

impl Violation {
    fn new(error_type: &'static str, label: &Label, message: String) -> Self {
        Self {
            error_type,
            message,
            key: label.key().to_string(),
        }
    }

    pub fn required(label: &Label) -> Self {
        Self::new("any.required", label, format!("{} é um campo obrigatório.", label))
    }

    pub fn only(label: &Label, valids: &[&str]) -> Self {
        let listed = valids
            .iter()
            .map(|v| format!("\"{}\"", v))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            "any.only",
            label,
            format!("{} deve possuir um dos seguintes valores: {}.", label, listed),
        )
    }

    pub fn string_base(label: &Label) -> Self {
        Self::new("string.base", label, format!("{} deve ser do tipo String.", label))
    }

    pub fn string_empty(label: &Label) -> Self {
        Self::new("string.empty", label, format!("{} não pode estar em branco.", label))
    }

    pub fn string_min(label: &Label, limit: usize) -> Self {
        Self::new(
            "string.min",
            label,
            format!("{} deve conter no mínimo {} {}.", label, limit, characters(limit)),
        )
    }

    pub fn string_max(label: &Label, limit: usize) -> Self {
        Self::new(
            "string.max",
            label,
            format!("{} deve conter no máximo {} {}.", label, limit, characters(limit)),
        )
    }

    pub fn string_length(label: &Label, limit: usize) -> Self {
        Self::new(
            "string.length",
            label,
            format!("{} deve possuir {} {}.", label, limit, characters(limit)),
        )
    }

    pub fn string_alphanum(label: &Label) -> Self {
        Self::new(
            "string.alphanum",
            label,
            format!("{} deve conter apenas caracteres alfanuméricos.", label),
        )
    }

    pub fn pattern(label: &Label) -> Self {
        Self::new(
            "string.pattern.base",
            label,
            format!("{} está no formato errado.", label),
        )
    }

    pub fn pattern_invert(label: &Label) -> Self {
        Self::new(
            "string.pattern.invert.base",
            label,
            format!("{} deve começar com caracteres visíveis.", label),
        )
    }

    pub fn uri(label: &Label) -> Self {
        Self::new("string.uri", label, format!("{} deve ser uma URI válida.", label))
    }

    pub fn number_base(label: &Label) -> Self {
        Self::new("number.base", label, format!("{} deve ser do tipo Number.", label))
    }

    pub fn number_integer(label: &Label) -> Self {
        Self::new("number.integer", label, format!("{} deve ser um Inteiro.", label))
    }

    pub fn number_unsafe(label: &Label) -> Self {
        Self::new(
            "number.unsafe",
            label,
            format!(
                "{} deve possuir um valor entre {} e {}.",
                label, MIN_INTEGER, MAX_INTEGER
            ),
        )
    }

    pub fn number_min(label: &Label, limit: &str) -> Self {
        Self::new(
            "number.min",
            label,
            format!("{} deve possuir um valor mínimo de {}.", label, limit),
        )
    }

    pub fn number_max(label: &Label, limit: &str) -> Self {
        Self::new(
            "number.max",
            label,
            format!("{} deve possuir um valor máximo de {}.", label, limit),
        )
    }

    pub fn number_positive(label: &Label) -> Self {
        Self::new(
            "number.positive",
            label,
            format!("{} deve ser um número positivo.", label),
        )
    }

    pub fn array_base(label: &Label) -> Self {
        Self::new(
            "array.base",
            label,
            format!("{} deve ser um array com base válida.", label),
        )
    }

    pub fn array_min(label: &Label, limit: usize) -> Self {
        let items = if limit == 1 { "item" } else { "itens" };
        Self::new(
            "array.min",
            label,
            format!("{} deve conter no mínimo {} {}.", label, limit, items),
        )
    }

    pub fn array_unique(label: &Label) -> Self {
        Self::new(
            "array.unique",
            label,
            format!("{} possui um valor duplicado.", label),
        )
    }

    pub fn object_base(label: &Label) -> Self {
        Self {
            error_type: "object.base",
            message: format!("{} enviado deve ser do tipo Object.", label),
            key: "object".to_string(),
        }
    }

    pub fn object_min() -> Self {
        Self {
            error_type: "object.min",
            message: "Objeto enviado deve ter no mínimo uma chave.".to_string(),
            key: "object".to_string(),
        }
    }
}

fn characters(limit: usize) -> &'static str {
    if limit == 1 {
        "caractere"
    } else {
        "caracteres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_labels_report_object_key() {
        let label = Label::field("order_status").item(0);
        let v = Violation::only(&label, &["pending", "accepted"]);
        assert_eq!(v.key, "object");
        assert_eq!(
            v.message,
            "\"order_status[0]\" deve possuir um dos seguintes valores: \"pending\", \"accepted\"."
        );
    }

    #[test]
    fn child_labels_report_property_key() {
        let label = Label::field("additional_ingredients").item(2).child("price");
        let v = Violation::required(&label);
        assert_eq!(v.key, "price");
        assert_eq!(
            v.message,
            "\"additional_ingredients[2].price\" é um campo obrigatório."
        );
    }

    #[test]
    fn singular_limit_uses_singular_noun() {
        let label = Label::field("name");
        assert_eq!(
            Violation::string_min(&label, 1).message,
            "\"name\" deve conter no mínimo 1 caractere."
        );
        assert_eq!(
            Violation::string_max(&label, 128).message,
            "\"name\" deve conter no máximo 128 caracteres."
        );
    }
}
