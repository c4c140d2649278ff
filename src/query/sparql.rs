use super::{GroupedValue, QueryExecutor};
use crate::error::{MqaError, Result};
use crate::types::config::EndpointSettings;
use crate::types::indicator::{EntityType, Property, RDF_NS};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashMap;

const RESULTS_JSON: &str = "application/sparql-results+json";
const COUNT_VAR: &str = "values";

#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
}

type Row = HashMap<String, SparqlTerm>;

/// [`QueryExecutor`] speaking the SPARQL 1.1 protocol to a remote endpoint.
pub struct SparqlExecutor {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl SparqlExecutor {
    pub fn new(settings: &EndpointSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("mqa/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.url.clone(),
            credentials: settings.credentials.clone(),
        })
    }

    fn select(&self, query: &str) -> Result<Vec<Row>> {
        tracing::debug!(endpoint = %self.endpoint, %query, "sparql select");
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, RESULTS_JSON)
            .form(&[("query", query)]);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            let excerpt: String = body.chars().take(200).collect();
            return Err(MqaError::Query(format!(
                "endpoint returned {status}: {}",
                excerpt.trim()
            )));
        }
        parse_bindings(&body)
    }
}

impl QueryExecutor for SparqlExecutor {
    fn count(&self, entity: EntityType) -> Result<u64> {
        let rows = self.select(&count_query(entity, None))?;
        single_count(&rows)
    }

    fn count_with_property(&self, entity: EntityType, property: Property) -> Result<u64> {
        let rows = self.select(&count_query(entity, Some(property)))?;
        single_count(&rows)
    }

    fn grouped_values(&self, entity: EntityType, property: Property) -> Result<Vec<GroupedValue>> {
        let rows = self.select(&grouped_query(entity, property))?;
        grouped_rows(&rows)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

pub fn count_query(entity: EntityType, property: Option<Property>) -> String {
    let mut pattern = format!("?resource <{}type> <{}> .", RDF_NS, entity.iri());
    if let Some(property) = property {
        pattern.push_str(&format!(" ?resource {} ?value .", property.sparql_path()));
    }
    format!("SELECT (COUNT(DISTINCT ?resource) AS ?{COUNT_VAR}) WHERE {{ {pattern} }}")
}

pub fn grouped_query(entity: EntityType, property: Property) -> String {
    format!(
        "SELECT ?value (COUNT(?value) AS ?count) \
         WHERE {{ ?resource <{}type> <{}> . ?resource {} ?value . }} GROUP BY ?value",
        RDF_NS,
        entity.iri(),
        property.sparql_path()
    )
}

fn parse_bindings(body: &str) -> Result<Vec<Row>> {
    let parsed: SparqlResults = serde_json::from_str(body)?;
    Ok(parsed.results.bindings)
}

/// Scalar count from a result set that must hold exactly one row.
fn single_count(rows: &[Row]) -> Result<u64> {
    match rows {
        [row] => {
            let term = row.get(COUNT_VAR).ok_or_else(|| {
                MqaError::Query(format!("count row is missing ?{COUNT_VAR}"))
            })?;
            parse_count(&term.value)
        }
        _ => Err(MqaError::Query(format!(
            "expected exactly one count row, got {}",
            rows.len()
        ))),
    }
}

fn grouped_rows(rows: &[Row]) -> Result<Vec<GroupedValue>> {
    rows.iter()
        .map(|row| {
            let value = row
                .get("value")
                .ok_or_else(|| MqaError::Query("grouped row is missing ?value".to_string()))?;
            let count = row
                .get("count")
                .ok_or_else(|| MqaError::Query("grouped row is missing ?count".to_string()))?;
            Ok(GroupedValue::new(value.value.clone(), parse_count(&count.value)?))
        })
        .collect()
}

fn parse_count(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| MqaError::Query(format!("count is not a non-negative integer: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sparql_json, TestServer};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Form, Router};
    use std::time::Duration;

    #[derive(Deserialize)]
    struct QueryForm {
        query: String,
    }

    async fn dataset_count(headers: HeaderMap, Form(form): Form<QueryForm>) -> Response {
        if !headers.contains_key(header::AUTHORIZATION) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if !form.query.contains("<http://www.w3.org/ns/dcat#Dataset>") {
            return (StatusCode::BAD_REQUEST, "unexpected query").into_response();
        }
        sparql_json(results(r#"{"values":{"value":"10"}}"#))
    }

    fn results(bindings: &str) -> String {
        format!(r#"{{"head":{{"vars":[]}},"results":{{"bindings":[{bindings}]}}}}"#)
    }

    #[test]
    fn count_query_uses_full_iris() {
        let query = count_query(EntityType::Dataset, Some(Property::Keyword));
        assert!(query.contains("<http://www.w3.org/ns/dcat#Dataset>"));
        assert!(query.contains("?resource <http://www.w3.org/ns/dcat#keyword> ?value"));
        assert!(query.contains("COUNT(DISTINCT ?resource) AS ?values"));
    }

    #[test]
    fn grouped_query_groups_by_value() {
        let query = grouped_query(EntityType::Distribution, Property::FormatValue);
        assert!(query.ends_with("GROUP BY ?value"));
        assert!(query.contains(
            "<http://purl.org/dc/terms/format>/<http://www.w3.org/1999/02/22-rdf-syntax-ns#value>"
        ));
    }

    #[test]
    fn single_count_requires_exactly_one_row() {
        let one = parse_bindings(&results(r#"{"values":{"type":"literal","value":"42"}}"#))
            .expect("parse");
        assert_eq!(single_count(&one).expect("count"), 42);

        let none = parse_bindings(&results("")).expect("parse");
        assert!(matches!(single_count(&none), Err(MqaError::Query(_))));

        let two = parse_bindings(&results(
            r#"{"values":{"value":"1"}},{"values":{"value":"2"}}"#,
        ))
        .expect("parse");
        assert!(matches!(single_count(&two), Err(MqaError::Query(_))));
    }

    #[test]
    fn non_integer_count_is_rejected() {
        let rows = parse_bindings(&results(r#"{"values":{"value":"-3"}}"#)).expect("parse");
        assert!(single_count(&rows).is_err());
    }

    #[test]
    fn grouped_rows_parse_value_and_count() {
        let rows = parse_bindings(&results(
            r#"{"value":{"type":"literal","value":"text/csv"},"count":{"type":"typed-literal","value":"3"}},
               {"value":{"type":"uri","value":"http://publications.europa.eu/resource/authority/file-type/JSON"},"count":{"value":"1"}}"#,
        ))
        .expect("parse");
        let grouped = grouped_rows(&rows).expect("grouped");
        assert_eq!(
            grouped,
            vec![
                GroupedValue::new("text/csv", 3),
                GroupedValue::new(
                    "http://publications.europa.eu/resource/authority/file-type/JSON",
                    1
                ),
            ]
        );
    }

    #[test]
    fn executor_posts_query_and_reads_json() {
        let server = TestServer::start(Router::new().route("/sparql", post(dataset_count)));
        let executor = SparqlExecutor::new(&EndpointSettings {
            url: server.url("/sparql"),
            credentials: Some(("admin".to_string(), "secret".to_string())),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build");

        assert_eq!(executor.count(EntityType::Dataset).expect("count"), 10);
    }

    #[test]
    fn executor_surfaces_endpoint_errors() {
        let server = TestServer::start(Router::new().route(
            "/sparql",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Virtuoso 37000 Error") }),
        ));
        let executor = SparqlExecutor::new(&EndpointSettings {
            url: server.url("/sparql"),
            credentials: None,
            timeout: Duration::from_secs(5),
        })
        .expect("client should build");

        let err = executor
            .count(EntityType::Distribution)
            .expect_err("500 should fail");
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn executor_without_credentials_is_rejected_by_protected_endpoint() {
        let server = TestServer::start(Router::new().route("/sparql", post(dataset_count)));
        let executor = SparqlExecutor::new(&EndpointSettings {
            url: server.url("/sparql"),
            credentials: None,
            timeout: Duration::from_secs(5),
        })
        .expect("client should build");

        let err = executor.count(EntityType::Dataset).expect_err("401 should fail");
        assert!(err.to_string().contains("401"));
    }
}
