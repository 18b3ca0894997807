use super::coerce::coerce;
use super::error::QueryError;
use super::params::RawFilter;
use super::types::{FilterCondition, FilterValue, OperatorKind, Scalar};
use super::validate::is_valid_field;

/// Builds typed filter conditions from the `filter[...]` namespace
pub struct FilterWhere;

impl FilterWhere {
    /// Invalid field names and unknown operators are dropped without error.
    /// Only malformed `between`/`null` operands fail the parse.
    pub fn parse(entries: &[(String, RawFilter)]) -> Result<Vec<FilterCondition>, QueryError> {
        let mut conditions = Vec::new();
        let mut dropped_fields = 0usize;
        let mut dropped_operators = 0usize;

        for (field, raw) in entries {
            if !is_valid_field(field) {
                dropped_fields += 1;
                continue;
            }
            match raw {
                RawFilter::Scalar(value) => conditions.push(FilterCondition {
                    field: field.clone(),
                    operator: OperatorKind::Eq,
                    value: FilterValue::Scalar(coerce(value)),
                }),
                RawFilter::Operators(ops) => {
                    for (token, operand) in ops {
                        let Some(operator) = OperatorKind::from_token(token) else {
                            dropped_operators += 1;
                            continue;
                        };
                        let value = Self::parse_operand(field, operator, operand)?;
                        conditions.push(FilterCondition { field: field.clone(), operator, value });
                    }
                }
            }
        }

        // Counts only; raw tokens are never echoed
        if dropped_fields > 0 || dropped_operators > 0 {
            tracing::debug!(dropped_fields, dropped_operators, "ignored unrecognized filter tokens");
        }

        Ok(conditions)
    }

    fn parse_operand(field: &str, operator: OperatorKind, operand: &str) -> Result<FilterValue, QueryError> {
        Ok(match operator {
            OperatorKind::In | OperatorKind::Nin => FilterValue::List(Self::split_list(operand)),
            OperatorKind::Between => {
                let parts = Self::split_list(operand);
                if parts.len() != 2 {
                    return Err(QueryError::InvalidBetween { field: field.to_string() });
                }
                FilterValue::List(parts)
            }
            OperatorKind::Null => match operand.to_lowercase().as_str() {
                "true" => FilterValue::Flag(true),
                "false" => FilterValue::Flag(false),
                _ => return Err(QueryError::InvalidNull { field: field.to_string() }),
            },
            _ => FilterValue::Scalar(coerce(operand)),
        })
    }

    fn split_list(operand: &str) -> Vec<Scalar> {
        operand.split(',').map(|part| coerce(part.trim())).collect()
    }
}
