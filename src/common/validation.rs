// src/common/validation.rs
//
// Regras de campo usadas pelos payloads (via `validator`) e a conversão dos
// erros para o formato `{property, constraints}` devolvido pela API.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::{AppError, FieldViolation};

pub static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("regex de CEP válida"));

pub static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("regex de UF válida"));

pub static CPF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{11}$").expect("regex de CPF válida"));

pub static CNPJ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{14}$").expect("regex de CNPJ válida"));

// DDD + número, fixo (10) ou celular (11)
pub static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10,11}$").expect("regex de telefone válida"));

/// Rejeita textos compostos apenas de espaços.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("isNotEmpty");
        err.message = Some("The field must not be empty.".into());
        return Err(err);
    }
    Ok(())
}

/// Valida o payload e converte a falha no erro padrão da API.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

/// Monta uma violação avulsa, para regras que dependem de mais de um campo.
pub fn violation(property: &str, rule: &str, message: impl Into<String>) -> FieldViolation {
    FieldViolation {
        property: property.to_string(),
        constraints: BTreeMap::from([(rule.to_string(), message.into())]),
    }
}

/// Agrupa os erros por campo: todas as regras violadas de um campo saem juntas.
pub fn collect_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let property = to_camel_case(&field.to_string());
            let constraints = field_errors
                .iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The \"{}\" field is invalid.", property));
                    (e.code.to_string(), message)
                })
                .collect();
            FieldViolation { property, constraints }
        })
        .collect();

    violations.sort_by(|a, b| a.property.cmp(&b.property));
    violations
}

// Os campos Rust são snake_case, a API fala camelCase
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
