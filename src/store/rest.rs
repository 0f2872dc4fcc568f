use super::{GeoStore, StoreError};
use crate::model::{Collection, EntityKind, NewEntity};
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Duration;

/// PostgREST-style HTTP backend: `GET /rest/v1/<table>` reads a table,
/// `POST /rest/v1/<table>` inserts one row. Geometry travels as GeoJSON.
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(concat!("campusmap/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table())
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Columns requested per table; buildings come back sorted by name.
fn select_query(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Building => {
            "select=id,name,latitude,longitude,total_floors,building_code,description,state&order=name.asc"
        }
        EntityKind::Footway => "select=id,name,state,access_type,geom",
        EntityKind::Entrance => "select=id,name,building_id,type,is_active,location",
        EntityKind::Parking => "select=id,name,building_id,type,is_active,capacity,location",
        EntityKind::Landmark => "select=id,name,building_id,type,is_active,location",
    }
}

fn check(kind: EntityKind, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(StoreError::Status {
        table: kind.table(),
        status: status.as_u16(),
        body,
    })
}

impl GeoStore for RestStore {
    fn fetch(&mut self, kind: EntityKind) -> Result<Collection, StoreError> {
        let url = format!("{}?{}", self.table_url(kind), select_query(kind));
        let response = check(kind, self.authorized(self.client.get(&url)).send()?)?;
        let text = response.text()?;
        let collection = match kind {
            EntityKind::Building => Collection::Buildings(serde_json::from_str(&text)?),
            EntityKind::Footway => Collection::Footways(serde_json::from_str(&text)?),
            EntityKind::Entrance => Collection::Entrances(serde_json::from_str(&text)?),
            EntityKind::Parking => Collection::Parkings(serde_json::from_str(&text)?),
            EntityKind::Landmark => Collection::Landmarks(serde_json::from_str(&text)?),
        };
        tracing::debug!(table = kind.table(), rows = collection.len(), "fetched");
        Ok(collection)
    }

    fn insert(&mut self, row: &NewEntity) -> Result<(), StoreError> {
        let kind = row.kind();
        let body = row.to_json()?;
        let request = self
            .authorized(self.client.post(self.table_url(kind)))
            .header("Prefer", "return=minimal")
            .json(&body);
        check(kind, request.send()?)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
