use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A generic `<param key=".." value=".."/>` entry as SUMO attaches them to vehicles, trips and
/// network elements.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Param {
    #[serde(rename = "@key")]
    pub key: String,
    #[serde(rename = "@value")]
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Param {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Params {
    params: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Interprets the value stored under `key` as a boolean. Missing keys yield `Ok(None)`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key).map(parse_bool).transpose()
    }

    /// Replaces an existing value or appends a new entry, keeping declaration order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.params.iter_mut().find(|p| p.key == key) {
            existing.value = value;
        } else {
            self.params.push(Param { key, value });
        }
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Params { params }
    }
}

impl From<Params> for Vec<Param> {
    fn from(params: Params) -> Self {
        params.params
    }
}

pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        other => Err(Error::invalid("boolean parameter", other)),
    }
}

#[cfg(test)]
mod tests {
    use crate::io::params::{Param, Params};

    #[test]
    fn find_and_parse() {
        let params = Params::from(vec![
            Param::new("junctionModel.ignoreRed", "true"),
            Param::new("note", "first responder"),
        ]);

        assert_eq!(Some("first responder"), params.get("note"));
        assert_eq!(Some(true), params.get_bool("junctionModel.ignoreRed").unwrap());
        assert_eq!(None, params.get_bool("missing").unwrap());
        assert!(params.get_bool("note").is_err());
    }

    #[test]
    fn insert_replaces() {
        let mut params = Params::new();
        params.insert("a", "0");
        params.insert("b", "1");
        params.insert("a", "1");

        assert_eq!(2, params.len());
        assert_eq!(Some(true), params.get_bool("a").unwrap());
        let keys: Vec<_> = params.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(vec!["a", "b"], keys);
    }
}
