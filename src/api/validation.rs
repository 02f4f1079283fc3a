use actix_web::HttpResponse;
use serde::Serialize;

/// Structured 400 body for payload validation failures
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

fn bad_request(error: &str, fields: serde_json::Value) -> actix_web::Error {
    let body = ErrorResponse {
        error: error.to_string(),
        fields,
    };
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().json(body))
        .into()
}

/// Creates a configured JsonConfig with standardized error handling for the
/// entire project. Validation runs before any handler or repository code.
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| match err {
        actix_web_validator::Error::Validate(validation_errors) => {
            let mut fields = serde_json::Map::new();
            for (field, errors) in validation_errors.field_errors() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation error in field: {}", field))
                    })
                    .collect();
                fields.insert(field.to_string(), serde_json::json!({ "errors": messages }));
            }
            bad_request("Validation failed", serde_json::Value::Object(fields))
        }
        actix_web_validator::Error::Deserialize(de_err) => {
            let err_string = de_err.to_string();
            let message = if err_string.contains("EOF while parsing") {
                "Request body is empty. Expected JSON payload"
            } else if err_string.contains("unknown variant") {
                "Invalid enum value. Check allowed values for this field"
            } else {
                "Invalid JSON format"
            };
            bad_request(
                "Request validation failed",
                serde_json::json!({ "message": message }),
            )
        }
        _ => bad_request(
            "Validation failed",
            serde_json::json!({ "message": "Validation error" }),
        ),
    })
}
