//! Memo table served by a PostgREST endpoint, such as a Supabase project.
//!
//! Structured [`Filter`]s are rendered into PostgREST query parameters
//! (`category=eq.work`, `or=(title.ilike."*q*",...)`). Error bodies are
//! decoded into [`StoreError::Api`], with `PGRST116` surfacing as
//! [`StoreError::NoRows`].

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult, NO_ROWS_CODE};
use crate::models::{MemoRow, MemoWrite};
use crate::query::{escape_like, Column, Filter, Query, MEMOS_TABLE};
use crate::store::MemoStore;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Remote memo table reached over the PostgREST HTTP API
pub struct PostgrestStore {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PostgrestStore {
    /// `project_url` is the Supabase project URL; `/rest/v1/memos` is appended
    pub fn new(project_url: &str, api_key: &str) -> Self {
        Self::with_client(Client::new(), project_url, api_key)
    }

    pub fn with_client(client: Client, project_url: &str, api_key: &str) -> Self {
        Self {
            client,
            endpoint: table_endpoint(project_url),
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method, params: &[(String, String)]) -> RequestBuilder {
        debug!(%method, endpoint = %self.endpoint, ?params, "postgrest request");
        self.client
            .request(method, &self.endpoint)
            .query(params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl MemoStore for PostgrestStore {
    async fn select(&self, query: &Query) -> StoreResult<Vec<MemoRow>> {
        let params = query_params("*", query);
        read_json(self.request(Method::GET, &params).send().await?).await
    }

    async fn select_single(&self, query: &Query) -> StoreResult<MemoRow> {
        let params = query_params("*", query);
        let request = self
            .request(Method::GET, &params)
            .header(header::ACCEPT, SINGLE_OBJECT);
        read_json(request.send().await?).await
    }

    async fn select_column(&self, column: Column, query: &Query) -> StoreResult<Vec<String>> {
        let params = query_params(column.as_str(), query);
        let rows: Vec<serde_json::Map<String, serde_json::Value>> =
            read_json(self.request(Method::GET, &params).send().await?).await?;

        Ok(rows
            .into_iter()
            .map(|mut row| match row.remove(column.as_str()) {
                Some(serde_json::Value::String(s)) => s,
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect())
    }

    async fn insert(&self, row: &MemoWrite) -> StoreResult<MemoRow> {
        let params = vec![select_param("*")];
        let request = self
            .request(Method::POST, &params)
            .header("Prefer", RETURN_REPRESENTATION)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(row);
        read_json(request.send().await?).await
    }

    async fn update(&self, row: &MemoWrite, filter: &Filter) -> StoreResult<MemoRow> {
        let params = vec![select_param("*"), filter_param(filter)];
        let request = self
            .request(Method::PATCH, &params)
            .header("Prefer", RETURN_REPRESENTATION)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .json(row);
        read_json(request.send().await?).await
    }

    async fn delete(&self, filter: &Filter) -> StoreResult<()> {
        let params = vec![filter_param(filter)];
        let response = self.request(Method::DELETE, &params).send().await?;
        check_status(response).await.map(|_| ())
    }
}

fn table_endpoint(project_url: &str) -> String {
    format!("{}/rest/v1/{}", project_url.trim_end_matches('/'), MEMOS_TABLE)
}

fn select_param(columns: &str) -> (String, String) {
    ("select".to_string(), columns.to_string())
}

/// Query string for a read: column selection, one parameter per filter, then order
fn query_params(columns: &str, query: &Query) -> Vec<(String, String)> {
    let mut params = vec![select_param(columns)];
    params.extend(query.filters.iter().map(filter_param));

    if let Some(order) = query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    params
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, value) => (column.to_string(), format!("eq.{}", value)),
        Filter::Neq(column, value) => (column.to_string(), format!("neq.{}", value)),
        Filter::AnyContains { columns, needle } => {
            let pattern = quote(&format!("*{}*", escape_like(needle)));
            let conditions: Vec<String> = columns
                .iter()
                .map(|column| format!("{}.ilike.{}", column, pattern))
                .collect();
            ("or".to_string(), format!("({})", conditions.join(",")))
        }
    }
}

/// Double-quote a value inside a logical filter so `,`, `.`, `:` and parens are literal
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn api_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) if err.code.as_deref() == Some(NO_ROWS_CODE) => StoreError::NoRows,
        Ok(err) => StoreError::Api {
            code: err.code.unwrap_or_else(|| status.to_string()),
            message: err.message.unwrap_or_else(|| body.to_string()),
            details: err.details,
            hint: err.hint,
            status,
        },
        Err(_) => StoreError::Api {
            code: status.to_string(),
            message: body.to_string(),
            details: None,
            hint: None,
            status,
        },
    }
}

async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(api_error(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_endpoint_from_project_url() {
        assert_eq!(
            table_endpoint("https://abc.supabase.co/"),
            "https://abc.supabase.co/rest/v1/memos"
        );

        let store = PostgrestStore::new("http://localhost:54321", "key");
        assert_eq!(store.endpoint(), "http://localhost:54321/rest/v1/memos");
    }

    #[test]
    fn test_category_query_params() {
        let query = Query::new()
            .filter(Filter::eq(Column::Category, "work"))
            .newest_first();

        assert_eq!(
            query_params("*", &query),
            vec![
                param("select", "*"),
                param("category", "eq.work"),
                param("order", "created_at.desc"),
            ]
        );
    }

    #[test]
    fn test_search_filter_is_quoted_and_escaped() {
        let filter = Filter::any_contains(&[Column::Title, Column::Content], "a,b 50%");

        assert_eq!(
            filter_param(&filter),
            param(
                "or",
                r#"(title.ilike."*a,b 50\\%*",content.ilike."*a,b 50\\%*")"#
            )
        );

        let filter = Filter::any_contains(&[Column::Title], r#"say "hi""#);
        assert_eq!(
            filter_param(&filter),
            param("or", r#"(title.ilike."*say \"hi\"*")"#)
        );
    }

    #[test]
    fn test_clear_all_filter() {
        assert_eq!(
            filter_param(&Filter::everything()),
            param("id", "neq.00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn test_no_rows_error_body() {
        let body = r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;

        assert!(matches!(api_error(406, body), StoreError::NoRows));
    }

    #[test]
    fn test_api_error_body() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.memos\" does not exist"}"#;

        let err = api_error(404, body);

        assert_eq!(err.code(), Some("42P01"));
        assert!(err.to_string().contains("does not exist"));
        assert!(matches!(err, StoreError::Api { status: 404, .. }));
    }

    #[test]
    fn test_unparseable_error_body() {
        let err = api_error(502, "Bad Gateway");

        assert_eq!(err.code(), Some("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }
}
