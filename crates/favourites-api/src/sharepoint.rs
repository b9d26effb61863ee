use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// OData flavour that returns bare JSON without `__metadata` envelopes
const ODATA_JSON: &str = "application/json;odata=nometadata";

#[derive(Error, Debug)]
pub enum SharePointError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SharePointError>;

/// Client for the list item endpoints of a single web.
///
/// Every call is a single request: failures are returned as-is and never retried.
pub struct SharePointClient {
    client: reqwest::Client,
    web_url: String,
    root_web_url: String,
    access_token: Option<String>,
}

impl SharePointClient {
    pub fn new(web_url: impl Into<String>, access_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()?;

        let web_url = trim_url(web_url.into());

        Ok(Self {
            client,
            root_web_url: web_url.clone(),
            web_url,
            access_token,
        })
    }

    /// Users are resolved against the site collection's root web, which may
    /// differ from the web holding the list
    pub fn with_root_web_url(mut self, root_web_url: impl Into<String>) -> Self {
        self.root_web_url = trim_url(root_web_url.into());
        self
    }

    pub fn web_url(&self) -> &str {
        &self.web_url
    }

    pub fn root_web_url(&self) -> &str {
        &self.root_web_url
    }

    fn items_url(&self, list: &str) -> String {
        format!(
            "{}/_api/web/lists/getbytitle('{}')/items",
            self.web_url,
            urlencoding::encode(&quote_odata(list))
        )
    }

    fn item_url(&self, list: &str, id: i64) -> String {
        format!("{}({})", self.items_url(list), id)
    }

    fn query_url(&self, list: &str, select: &[String], filter: &str) -> String {
        let mut url = format!(
            "{}?$select={}",
            self.items_url(list),
            urlencoding::encode(&select.join(","))
        );
        if !filter.is_empty() {
            url.push_str("&$filter=");
            url.push_str(&urlencoding::encode(filter));
        }
        url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(ref token) = self.access_token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Query list items with an explicit field projection and OData filter.
    ///
    /// The server pages large results; every `odata.nextLink` is followed so
    /// the returned list is complete.
    pub async fn get_items<T: DeserializeOwned>(
        &self,
        list: &str,
        select: &[String],
        filter: &str,
    ) -> Result<Vec<T>> {
        let mut next = Some(self.query_url(list, select, filter));
        let mut items = Vec::new();

        while let Some(url) = next {
            let response = self.request(Method::GET, &url).send().await?;
            let response = check_response(response, list).await?;

            let body = response.text().await?;
            let page: ItemsResponse<T> = serde_json::from_str(&body)?;
            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }

    /// Create a list item, returning the record the server stored
    pub async fn add_item<B, T>(&self, list: &str, fields: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.items_url(list);
        let response = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, ODATA_JSON)
            .body(serde_json::to_vec(fields)?)
            .send()
            .await?;
        let response = check_response(response, list).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn merge_request<B>(&self, list: &str, id: i64, fields: &B) -> Result<RequestBuilder>
    where
        B: Serialize + ?Sized,
    {
        let url = self.item_url(list, id);
        Ok(self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, ODATA_JSON)
            .header("X-HTTP-Method", "MERGE")
            .header("IF-MATCH", "*")
            .body(serde_json::to_vec(fields)?))
    }

    fn delete_request(&self, list: &str, id: i64) -> RequestBuilder {
        let url = self.item_url(list, id);
        self.request(Method::POST, &url)
            .header("X-HTTP-Method", "DELETE")
            .header("IF-MATCH", "*")
    }

    /// Merge the given fields into an existing item. The server answers 204
    /// with no body.
    pub async fn update_item<B>(&self, list: &str, id: i64, fields: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.merge_request(list, id, fields)?.send().await?;
        check_response(response, &format!("{} item {}", list, id)).await?;
        Ok(())
    }

    pub async fn delete_item(&self, list: &str, id: i64) -> Result<()> {
        let response = self.delete_request(list, id).send().await?;
        check_response(response, &format!("{} item {}", list, id)).await?;
        Ok(())
    }

    /// Map a login name or email to the site user, creating the user entry
    /// on the root web if it does not exist yet
    pub async fn ensure_user(&self, login: &str) -> Result<SharePointUser> {
        let url = format!("{}/_api/web/ensureuser", self.root_web_url);
        let body = EnsureUserRequest { logon_name: login };
        let response = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, ODATA_JSON)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;
        let response = check_response(response, login).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("favourites/0.1.0"));
    headers.insert(ACCEPT, HeaderValue::from_static(ODATA_JSON));
    headers
}

async fn check_response(response: reqwest::Response, subject: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, subject, body))
}

fn error_for_status(status: StatusCode, subject: &str, body: String) -> SharePointError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SharePointError::AuthRequired,
        StatusCode::NOT_FOUND => SharePointError::NotFound(subject.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SharePointError::RateLimitExceeded,
        _ => SharePointError::RequestFailed(format!("Status {}: {}", status, body)),
    }
}

/// Single quotes inside OData string literals are escaped by doubling them
fn quote_odata(value: &str) -> String {
    value.replace('\'', "''")
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Collection envelope returned by `odata=nometadata` queries
#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    value: Vec<T>,
    #[serde(rename = "odata.nextLink", default)]
    next_link: Option<String>,
}

#[derive(Debug, Serialize)]
struct EnsureUserRequest<'a> {
    #[serde(rename = "logonName")]
    logon_name: &'a str,
}

/// Site user as returned by `ensureuser`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointUser {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "LoginName", default)]
    pub login_name: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
}
