//! Flattening of `validator` results into user-facing messages

use validator::ValidationErrors;

/// One message per failed rule, ordered by field name
pub(crate) fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("Campo inválido: {}", field),
            })
        })
        .collect()
}
