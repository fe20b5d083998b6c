use serde::Serialize;
use serde_json::json;

use crate::config::ResolvedConfig;

const MASKED: &str = "********";

pub fn emit_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

pub fn emit_json_value(value: &serde_json::Value, pretty: bool) -> anyhow::Result<String> {
    emit_json(value, pretty)
}

pub fn error_json(message: &str, kind: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "kind": kind,
        }
    })
}

pub fn config_to_json(resolved: &ResolvedConfig) -> serde_json::Value {
    json!({
        "configPath": resolved.config_path.as_ref().map(|p| p.display().to_string()),
        "profileName": resolved.profile_name,
        "connection": {
            "server": resolved.connection.server,
            "port": resolved.connection.port,
            "database": resolved.connection.database,
            "user": resolved.connection.user,
            "password": resolved.connection.password.as_ref().map(|_| MASKED),
            "encrypt": resolved.connection.encrypt,
            "trustCert": resolved.connection.trust_cert,
            "timeoutMs": resolved.connection.timeout_ms,
            "schema": resolved.connection.schema,
        },
        "settings": {
            "output": {
                "defaultFormat": resolved.settings.output.default_format.as_str(),
                "json": {
                    "pretty": resolved.settings.output.json_pretty,
                },
            },
            "compare": {
                "maxDurationMs": resolved.settings.compare.max_duration_ms,
                "showDiff": resolved.settings.compare.show_diff,
            }
        }
    })
}

pub fn mask_password(password: Option<&str>) -> String {
    match password {
        Some(_) => MASKED.to_string(),
        None => "(none)".to_string(),
    }
}
