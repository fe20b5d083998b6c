use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Snapshot the process environment after loading `env_file`, or `.env`
    /// when none is given. A missing file is not an error.
    pub fn from_system(env_file: Option<&Path>) -> Self {
        let loaded = match env_file {
            Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
            None => dotenvy::dotenv(),
        };
        if let Err(err) = loaded {
            tracing::debug!("No env file loaded: {err}");
        }
        let vars = std::env::vars().collect();
        Self { vars }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut vars = HashMap::new();
        for (k, v) in pairs {
            vars.insert((*k).to_string(), (*v).to_string());
        }
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    pub fn get_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.vars.get(*key).cloned())
    }
}

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bool_spellings() {
        assert_eq!(parse_bool(" Yes "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn get_any_prefers_earlier_keys() {
        let env = Env::from_pairs(&[("B", "2"), ("A", "1")]);
        assert_eq!(env.get_any(&["A", "B"]).as_deref(), Some("1"));
        assert_eq!(env.get_any(&["C"]), None);
    }
}
