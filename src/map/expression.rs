//! Data-driven fill color for the country layer
//!
//! The paint value is a `match` expression on the feature's ISO code:
//! `["match", ["get", <code property>], code, color, ..., default]`, where the
//! code property defaults to `iso_3166_1`.

use crate::api::types::CountryMood;
use crate::config::DEFAULT_CODE_PROPERTY;
use serde_json::{json, Value};

/// Color for countries without data (the Calm blue)
pub const DEFAULT_FILL: &str = "#38bdf8";

#[derive(Clone, Debug, PartialEq)]
pub struct FillColorExpression {
    property: String,
    branches: Vec<(String, String)>,
    default: String,
}

/// Build the match expression from `(code, color)` pairs. Codes are kept in
/// input order; a repeated code keeps the color it was first given.
pub fn build_fill_color_expression<C, K>(pairs: &[(C, K)]) -> FillColorExpression
where
    C: AsRef<str>,
    K: AsRef<str>,
{
    let mut branches: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (code, color) in pairs {
        let code = code.as_ref();
        if branches.iter().any(|(c, _)| c == code) {
            continue;
        }
        branches.push((code.to_string(), color.as_ref().to_string()));
    }
    FillColorExpression {
        property: DEFAULT_CODE_PROPERTY.to_string(),
        branches,
        default: DEFAULT_FILL.to_string(),
    }
}

impl FillColorExpression {
    pub fn from_countries(countries: &[CountryMood]) -> Self {
        let pairs: Vec<(&str, &str)> = countries
            .iter()
            .map(|c| (c.country_code.as_str(), c.color_code.as_str()))
            .collect();
        build_fill_color_expression(&pairs)
    }

    /// Key the match on another feature property
    pub fn keyed_by(mut self, property: &str) -> Self {
        if !property.is_empty() {
            self.property = property.to_string();
        }
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    #[cfg(test)]
    pub fn branches(&self) -> &[(String, String)] {
        &self.branches
    }

    #[cfg(test)]
    pub fn default_color(&self) -> &str {
        &self.default
    }

    /// Color the expression yields for a feature code
    pub fn evaluate(&self, code: &str) -> &str {
        self.branches
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, color)| color.as_str())
            .unwrap_or(&self.default)
    }

    /// The expression as paint-property JSON
    pub fn to_json(&self) -> Value {
        let mut expr = vec![json!("match"), json!(["get", self.property])];
        for (code, color) in &self.branches {
            expr.push(json!(code));
            expr.push(json!(color));
        }
        expr.push(json!(self.default));
        Value::Array(expr)
    }
}
