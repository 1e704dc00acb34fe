//! Static placeholder check
//!
//! Walks a scenario in execution order and flags placeholders that nothing
//! defines by the time they are used, without sending any request.

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::config::TestScenario;
use crate::vars::referenced_variables;

/// A problem found in one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    pub endpoint: String,
    pub field: String,
    pub message: String,
}

/// Find undefined or malformed placeholders
///
/// `predefined` names variables supplied from outside the scenario, such as
/// command-line seeds.
pub fn lint(scenario: &TestScenario, predefined: &[String]) -> Vec<LintIssue> {
    let mut known: HashSet<&str> = scenario.variables.keys().map(String::as_str).collect();
    known.extend(predefined.iter().map(String::as_str));

    let mut issues = Vec::new();

    for endpoint in &scenario.endpoints {
        let mut templates: Vec<(String, &str)> = vec![
            ("url".to_string(), endpoint.url.as_str()),
            ("method".to_string(), endpoint.method.as_str()),
        ];
        for (name, value) in &endpoint.headers {
            templates.push((format!("headers.{}", name), value.as_str()));
        }
        if let Some(body) = &endpoint.body {
            collect_strings("body", body, &mut templates);
        }
        if let Some(fields) = &endpoint.multipart_fields {
            collect_strings("multipartFields", fields, &mut templates);
        }

        let mut check = |field: &str, template: &str, known: &HashSet<&str>| {
            match referenced_variables(template) {
                Ok(names) => {
                    for name in names.into_iter().filter(|n| !known.contains(n.as_str())) {
                        issues.push(LintIssue {
                            endpoint: endpoint.name.clone(),
                            field: field.to_string(),
                            message: format!("'{}' is not defined by an earlier endpoint", name),
                        });
                    }
                }
                Err(e) => issues.push(LintIssue {
                    endpoint: endpoint.name.clone(),
                    field: field.to_string(),
                    message: format!("malformed placeholder left as-is: {}", e),
                }),
            }
        };

        for (field, template) in &templates {
            check(field.as_str(), *template, &known);
        }

        // Expectations are resolved after this endpoint's own captures
        if let Some(vars) = &endpoint.response_variables {
            known.extend(vars.keys().map(String::as_str));
        }
        if let Some(expected) = &endpoint.expected_response {
            let mut expected_templates = Vec::new();
            collect_strings("expectedResponse", expected, &mut expected_templates);
            for (field, template) in &expected_templates {
                check(field.as_str(), *template, &known);
            }
        }
    }

    issues
}

fn collect_strings<'a>(prefix: &str, map: &'a Map<String, Value>, out: &mut Vec<(String, &'a str)>) {
    for (key, value) in map {
        collect_value(format!("{}.{}", prefix, key), value, out);
    }
}

fn collect_value<'a>(path: String, value: &'a Value, out: &mut Vec<(String, &'a str)>) {
    match value {
        Value::String(s) => out.push((path, s.as_str())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_value(format!("{}[{}]", path, i), item, out);
            }
        }
        Value::Object(map) => collect_strings(&path, map, out),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_scenario_has_no_issues() {
        let scenario = TestScenario::from_yaml(
            r#"
variables:
  base: http://api
endpoints:
  - name: login
    url: "{{base}}/login"
    method: POST
    expectedStatus: 200
    responseVariables: {token: access_token}
    expectedResponse: {access_token: "{{token}}"}
  - name: me
    url: "{{base}}/me"
    method: GET
    headers:
      Authorization: "Bearer {{token}}"
    expectedStatus: 200
"#,
        )
        .unwrap();
        assert!(lint(&scenario, &[]).is_empty());
    }

    #[test]
    fn test_undefined_and_malformed_placeholders() {
        let scenario = TestScenario::from_yaml(
            r#"
endpoints:
  - name: first
    url: "http://api/{{uid}}"
    method: GET
    body:
      items: [{ref: "{{later}}"}, "{{ bad"]
    expectedStatus: 200
    responseVariables: {later: id}
  - name: second
    url: "http://api/{{later}}/{{env}}"
    method: GET
    expectedStatus: 200
"#,
        )
        .unwrap();
        let issues = lint(&scenario, &["env".to_string()]);
        let fields: Vec<(&str, &str)> = issues
            .iter()
            .map(|i| (i.endpoint.as_str(), i.field.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("first", "url"),
                ("first", "body.items[0].ref"),
                ("first", "body.items[1]"),
            ]
        );
        assert!(issues[2].message.starts_with("malformed placeholder"));
    }
}
