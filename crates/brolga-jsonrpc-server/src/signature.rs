//! Declared parameter signatures and argument binding.
//!
//! Every dispatch target declares an ordered [`ParameterSignature`]; the
//! binder resolves supplied positional or named params against it and
//! produces the final argument vector. No value coercion is performed.

use serde_json::Value;

use crate::error::ProcedureError;
use crate::request::RequestParams;

/// One declared parameter: a name and, optionally, a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub default: Option<Value>,
}

/// Ordered parameter list of a dispatch target.
///
/// Parameters without defaults are required and must precede optional ones,
/// mirroring how signatures are declared in every mainstream language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSignature {
    params: Vec<ParamSpec>,
}

impl ParameterSignature {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a required parameter.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: None,
        });
        self
    }

    /// Append an optional parameter with its default value.
    pub fn optional(mut self, name: impl Into<String>, default: Value) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            default: Some(default),
        });
        self
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of parameters without a default.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    /// Total number of declared parameters.
    pub fn max_count(&self) -> usize {
        self.params.len()
    }

    /// Resolve supplied params against this signature.
    ///
    /// Arity is checked first, then params are classified positional (array,
    /// or object keyed exactly `"0".."n-1"`) or named. Named binding walks
    /// the declared order, falling back to defaults; extra named keys are
    /// ignored. `named_from_map` off means an object param is not spread into
    /// named arguments but passed through as a single positional value.
    pub fn bind(
        &self,
        supplied: Option<&RequestParams>,
        named_from_map: bool,
    ) -> Result<Vec<Value>, ProcedureError> {
        let supplied = match supplied {
            Some(params) => params,
            None => {
                if self.required_count() > 0 {
                    return Err(ProcedureError::invalid_params("wrong number of arguments"));
                }
                return Ok(self
                    .params
                    .iter()
                    .filter_map(|p| p.default.clone())
                    .collect());
            }
        };

        if let RequestParams::Object(map) = supplied
            && !named_from_map
        {
            // Single-map spreading disabled: the whole object is one argument.
            let values = vec![Value::Object(map.clone())];
            self.check_arity(values.len())?;
            return self.fill_trailing_defaults(values);
        }

        if let Some(values) = supplied.as_positional() {
            self.check_arity(values.len())?;
            return self.fill_trailing_defaults(values);
        }

        // Named binding. Arity bounds apply to the supplied count before
        // unknown keys are discarded.
        self.check_arity(supplied.len())?;
        let mut bound = Vec::with_capacity(self.params.len());
        for spec in &self.params {
            match supplied.get(&spec.name) {
                Some(value) => bound.push(value.clone()),
                None => match &spec.default {
                    Some(default) => bound.push(default.clone()),
                    None => {
                        return Err(ProcedureError::invalid_params(format!(
                            "missing argument: {}",
                            spec.name
                        )));
                    }
                },
            }
        }
        Ok(bound)
    }

    /// Extend positionally supplied values with the defaults of the
    /// parameters they left off, so targets always receive the full declared
    /// argument count.
    fn fill_trailing_defaults(&self, mut values: Vec<Value>) -> Result<Vec<Value>, ProcedureError> {
        for spec in &self.params[values.len()..] {
            match &spec.default {
                Some(default) => values.push(default.clone()),
                None => {
                    return Err(ProcedureError::invalid_params(format!(
                        "missing argument: {}",
                        spec.name
                    )));
                }
            }
        }
        Ok(values)
    }

    fn check_arity(&self, supplied: usize) -> Result<(), ProcedureError> {
        if supplied < self.required_count() {
            return Err(ProcedureError::invalid_params("wrong number of arguments"));
        }
        if supplied > self.max_count() {
            return Err(ProcedureError::invalid_params("too many arguments"));
        }
        Ok(())
    }
}
