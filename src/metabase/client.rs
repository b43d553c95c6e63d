use super::MetabaseError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SESSION_HEADER: &str = "X-Metabase-Session";

/// An authenticated Metabase session token
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatabaseList {
    Paged { data: Vec<DatabaseSummary> },
    Bare(Vec<DatabaseSummary>),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseDetails {
    pub database_file: String,
}

/// Body of the create and update database calls
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseRequest {
    pub engine: String,
    pub name: String,
    pub details: DatabaseDetails,
}

impl DatabaseRequest {
    pub fn duckdb(name: &str, database_file: &str) -> Self {
        Self {
            engine: "duckdb".to_string(),
            name: name.to_string(),
            details: DatabaseDetails {
                database_file: database_file.to_string(),
            },
        }
    }
}

pub struct MetabaseClient {
    host: String,
    http: reqwest::Client,
}

impl MetabaseClient {
    pub fn new(host: &str) -> Result<Self, MetabaseError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| MetabaseError::Request {
                url: host.to_string(),
                source,
            })?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, MetabaseError> {
        let url = self.url("/api/session");
        debug!("Requesting Metabase session from {url}");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|source| MetabaseError::Request {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }

    pub async fn list_databases(&self, session: &Session) -> Result<Vec<DatabaseSummary>, MetabaseError> {
        let url = self.url("/api/database");
        let response = self
            .http
            .get(&url)
            .header(SESSION_HEADER, &session.id)
            .send()
            .await
            .map_err(|source| MetabaseError::Request {
                url: url.clone(),
                source,
            })?;
        let list: DatabaseList = decode(url, response).await?;
        Ok(match list {
            DatabaseList::Paged { data } => data,
            DatabaseList::Bare(data) => data,
        })
    }

    pub async fn find_database(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<DatabaseSummary>, MetabaseError> {
        Ok(self
            .list_databases(session)
            .await?
            .into_iter()
            .find(|db| db.name == name))
    }

    pub async fn create_database(
        &self,
        session: &Session,
        request: &DatabaseRequest,
    ) -> Result<(), MetabaseError> {
        let url = self.url("/api/database");
        let response = self
            .http
            .post(&url)
            .header(SESSION_HEADER, &session.id)
            .json(request)
            .send()
            .await
            .map_err(|source| MetabaseError::Request {
                url: url.clone(),
                source,
            })?;
        expect_ok(url, response).await
    }

    pub async fn update_database(
        &self,
        session: &Session,
        id: i64,
        request: &DatabaseRequest,
    ) -> Result<(), MetabaseError> {
        let url = self.url(&format!("/api/database/{id}"));
        let response = self
            .http
            .put(&url)
            .header(SESSION_HEADER, &session.id)
            .json(request)
            .send()
            .await
            .map_err(|source| MetabaseError::Request {
                url: url.clone(),
                source,
            })?;
        expect_ok(url, response).await
    }
}

async fn expect_ok(url: String, response: reqwest::Response) -> Result<(), MetabaseError> {
    let status = response.status();
    if status == reqwest::StatusCode::OK {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(MetabaseError::Status {
        url,
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(
    url: String,
    response: reqwest::Response,
) -> Result<T, MetabaseError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MetabaseError::Status {
            url,
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|source| MetabaseError::Decode { url, source })
}
