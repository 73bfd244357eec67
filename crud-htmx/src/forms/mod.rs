//! Default form binder
//!
//! Converts submitted `application/x-www-form-urlencoded` values into typed
//! model fields, driven by the model's [`ModelSchema`]. The model is
//! serialized to a JSON object, the converted values are overlaid, and the
//! result is deserialized back, so untouched fields keep their current
//! values.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Number, Value};
use thiserror::Error;

use crate::schema::{AdminModel, FieldKind, FieldSpec, ModelSchema};

/// Form binding failure
#[derive(Debug, Error)]
pub enum BindError {
    /// A form value could not be converted to the field's kind
    #[error("cannot parse {value:?} as {kind} for field '{field}'")]
    Parse {
        /// Field name
        field: String,
        /// Rejected raw value
        value: String,
        /// Expected kind
        kind: FieldKind,
    },

    /// The field's kind is not form-bindable
    #[error("unsupported kind {kind} for field '{field}'")]
    Unsupported {
        /// Field name
        field: String,
        /// Offending kind
        kind: FieldKind,
    },

    /// The model did not (de)serialize as a JSON object
    #[error("model record error: {0}")]
    Record(String),
}

/// Binder callback used by the controller's upsert handler
///
/// The default is [`apply_form`]; install a custom one with
/// [`CrudCtrl::with_form_binder`](crate::controller::CrudCtrl::with_form_binder).
pub type FormBinder<M> =
    Arc<dyn Fn(&HashMap<String, String>, &mut M) -> Result<(), BindError> + Send + Sync>;

/// Bind form values onto a model instance
///
/// Every schema field with a non-empty form value is converted and applied;
/// absent or empty values leave the field unmodified.
pub fn apply_form<M: AdminModel>(
    form: &HashMap<String, String>,
    model: &mut M,
) -> Result<(), BindError> {
    let schema = M::schema();
    let mut base =
        serde_json::to_value(&*model).map_err(|e| BindError::Record(e.to_string()))?;
    let Some(obj) = base.as_object_mut() else {
        return Err(BindError::Record("model is not a JSON object".into()));
    };

    for field in &schema.fields {
        let Some(raw) = form.get(&field.name) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        obj.insert(field.name.clone(), convert(field, raw)?);
    }

    *model = serde_json::from_value(base).map_err(|e| BindError::Record(e.to_string()))?;
    Ok(())
}

/// Convert one raw form value per the field's kind
pub fn convert(field: &FieldSpec, raw: &str) -> Result<Value, BindError> {
    let parse_err = || BindError::Parse {
        field: field.name.clone(),
        value: raw.to_string(),
        kind: field.kind,
    };
    Ok(match field.kind {
        FieldKind::Text => Value::String(raw.to_string()),
        FieldKind::Int => {
            let n: i64 = raw.parse().map_err(|_| parse_err())?;
            Value::Number(n.into())
        }
        FieldKind::UInt => {
            let n: u64 = raw.parse().map_err(|_| parse_err())?;
            Value::Number(n.into())
        }
        FieldKind::Float32 => {
            let n: f32 = raw.parse().map_err(|_| parse_err())?;
            Value::Number(Number::from_f64(f64::from(n)).ok_or_else(parse_err)?)
        }
        FieldKind::Float64 => {
            let n: f64 = raw.parse().map_err(|_| parse_err())?;
            Value::Number(Number::from_f64(n).ok_or_else(parse_err)?)
        }
        FieldKind::Bool => {
            Value::Bool(matches!(raw, "true" | "1" | "checked" | "on"))
        }
        FieldKind::Json => {
            return Err(BindError::Unsupported {
                field: field.name.clone(),
                kind: field.kind,
            })
        }
    })
}

/// Helper used where a schema is bound outside a typed model: convert a whole
/// form into a typed JSON object
pub fn form_to_record(
    schema: &ModelSchema,
    form: &HashMap<String, String>,
) -> Result<Value, BindError> {
    let mut obj = serde_json::Map::new();
    for field in &schema.fields {
        let Some(raw) = form.get(&field.name) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        obj.insert(field.name.clone(), convert(field, raw)?);
    }
    Ok(Value::Object(obj))
}
