// SPDX-License-Identifier: GPL-3.0-only

//! Typed runtime options, global with per-output overrides. Nothing is
//! persisted; declarations happen at startup or from the init script.

use std::collections::HashMap;
use std::fmt;

use crate::shell::OutputId;

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Int(i32),
    Uint(u32),
    Fixed(f64),
    String(String),
}

impl OptionValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Int(_) => "int",
            OptionValue::Uint(_) => "uint",
            OptionValue::Fixed(_) => "fixed",
            OptionValue::String(_) => "string",
        }
    }

    /// Parse `raw` with the same type as `self`.
    fn parse_as(&self, raw: &str) -> Result<OptionValue, OptionsError> {
        let invalid = || OptionsError::InvalidValue {
            value: raw.to_owned(),
            expected: self.type_name(),
        };
        Ok(match self {
            OptionValue::Int(_) => OptionValue::Int(raw.parse().map_err(|_| invalid())?),
            OptionValue::Uint(_) => OptionValue::Uint(raw.parse().map_err(|_| invalid())?),
            OptionValue::Fixed(_) => OptionValue::Fixed(raw.parse().map_err(|_| invalid())?),
            OptionValue::String(_) => OptionValue::String(raw.to_owned()),
        })
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Uint(v) => write!(f, "{v}"),
            OptionValue::Fixed(v) => write!(f, "{v}"),
            OptionValue::String(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OptionsError {
    #[error("option {0} has not been declared")]
    NotDeclared(String),
    #[error("option {0} is already declared")]
    AlreadyDeclared(String),
    #[error("invalid {expected} value: {value}")]
    InvalidValue { value: String, expected: &'static str },
    #[error("option {0} is not numeric")]
    NotNumeric(String),
}

#[derive(Debug, Default)]
pub struct OptionsStore {
    global: HashMap<String, OptionValue>,
    per_output: HashMap<OutputId, HashMap<String, OptionValue>>,
}

impl OptionsStore {
    pub fn declare(&mut self, name: &str, default: OptionValue) -> Result<(), OptionsError> {
        if self.global.contains_key(name) {
            return Err(OptionsError::AlreadyDeclared(name.to_owned()));
        }
        self.global.insert(name.to_owned(), default);
        Ok(())
    }

    /// The effective value on `output`, falling back to the global value.
    pub fn get(&self, output: Option<OutputId>, name: &str) -> Option<&OptionValue> {
        output
            .and_then(|id| self.per_output.get(&id))
            .and_then(|scope| scope.get(name))
            .or_else(|| self.global.get(name))
    }

    pub fn set(
        &mut self,
        output: Option<OutputId>,
        name: &str,
        raw: &str,
    ) -> Result<(), OptionsError> {
        let declared = self
            .global
            .get(name)
            .ok_or_else(|| OptionsError::NotDeclared(name.to_owned()))?;
        let value = declared.parse_as(raw)?;
        match output {
            Some(id) => {
                self.per_output.entry(id).or_default().insert(name.to_owned(), value);
            }
            None => {
                self.global.insert(name.to_owned(), value);
            }
        }
        Ok(())
    }

    /// Drop an output-scoped override, re-exposing the global value.
    pub fn unset(&mut self, output: OutputId, name: &str) -> Result<(), OptionsError> {
        if !self.global.contains_key(name) {
            return Err(OptionsError::NotDeclared(name.to_owned()));
        }
        if let Some(scope) = self.per_output.get_mut(&output) {
            scope.remove(name);
        }
        Ok(())
    }

    /// Add a delta to a numeric option.
    pub fn modify(
        &mut self,
        output: Option<OutputId>,
        name: &str,
        delta: &str,
    ) -> Result<(), OptionsError> {
        let current = self
            .get(output, name)
            .ok_or_else(|| OptionsError::NotDeclared(name.to_owned()))?
            .clone();
        let updated = match &current {
            OptionValue::Int(v) => {
                let d: i32 = delta.parse().map_err(|_| OptionsError::InvalidValue {
                    value: delta.to_owned(),
                    expected: "int",
                })?;
                OptionValue::Int(v.saturating_add(d))
            }
            OptionValue::Uint(v) => {
                let d: i64 = delta.parse().map_err(|_| OptionsError::InvalidValue {
                    value: delta.to_owned(),
                    expected: "int",
                })?;
                let sum = *v as i64 + d;
                if sum < 0 {
                    return Err(OptionsError::InvalidValue {
                        value: delta.to_owned(),
                        expected: "uint",
                    });
                }
                OptionValue::Uint(sum.min(u32::MAX as i64) as u32)
            }
            OptionValue::Fixed(v) => {
                let d: f64 = delta.parse().map_err(|_| OptionsError::InvalidValue {
                    value: delta.to_owned(),
                    expected: "fixed",
                })?;
                OptionValue::Fixed(v + d)
            }
            OptionValue::String(_) => return Err(OptionsError::NotNumeric(name.to_owned())),
        };
        match output {
            Some(id) => {
                self.per_output.entry(id).or_default().insert(name.to_owned(), updated);
            }
            None => {
                self.global.insert(name.to_owned(), updated);
            }
        }
        Ok(())
    }

    /// Forget every override scoped to a removed output.
    pub fn forget_output(&mut self, output: OutputId) {
        self.per_output.remove(&output);
    }

    /// Convenience for options the compositor itself consumes.
    pub fn uint(&self, name: &str) -> Option<u32> {
        match self.get(None, name) {
            Some(OptionValue::Uint(v)) => Some(*v),
            _ => None,
        }
    }
}
