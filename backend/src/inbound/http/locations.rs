//! Locality and store handlers.
//!
//! ```text
//! GET  /api/v1/localities?search=iasi
//! POST /api/v1/localities {"name":"Iasi","county":"Iasi","latitude":47.16,"longitude":27.58}
//! GET  /api/v1/stores?localityId=...
//! POST /api/v1/stores {"code":"IS-01","name":"Iulius","localityId":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{NewLocality, NewStore};
use crate::domain::{Coordinates, Error, Locality, Store};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_coordinates, parse_id, parse_optional_id,
};

const LOCALITY_ID: FieldName = FieldName::new("localityId");

fn split(coordinates: Option<Coordinates>) -> (Option<f64>, Option<f64>) {
    coordinates.map_or((None, None), |c| (Some(c.latitude()), Some(c.longitude())))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalityResponse {
    pub id: Uuid,
    #[schema(example = "Pascani")]
    pub name: String,
    #[schema(example = "Iasi")]
    pub county: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Locality> for LocalityResponse {
    fn from(locality: Locality) -> Self {
        let (latitude, longitude) = split(locality.coordinates());
        Self {
            id: *locality.id().as_uuid(),
            name: locality.name().to_owned(),
            county: locality.county().to_owned(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: Uuid,
    #[schema(example = "IS-01")]
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub locality_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        let (latitude, longitude) = split(store.coordinates());
        Self {
            id: *store.id().as_uuid(),
            code: store.code().to_owned(),
            name: store.name().to_owned(),
            address: store.address().map(str::to_owned),
            locality_id: *store.locality_id().as_uuid(),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListLocalitiesQuery {
    /// Case-insensitive substring of the locality name.
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresQuery {
    pub locality_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalityRequest {
    pub name: String,
    pub county: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TryFrom<CreateLocalityRequest> for NewLocality {
    type Error = Error;

    fn try_from(value: CreateLocalityRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            coordinates: parse_coordinates(value.latitude, value.longitude)?,
            name: value.name,
            county: value.county,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub locality_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TryFrom<CreateStoreRequest> for NewStore {
    type Error = Error;

    fn try_from(value: CreateStoreRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            locality_id: parse_id(&value.locality_id, LOCALITY_ID)?,
            coordinates: parse_coordinates(value.latitude, value.longitude)?,
            code: value.code,
            name: value.name,
            address: value.address,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/localities",
    params(ListLocalitiesQuery),
    responses((status = 200, description = "Localities ordered by name", body = [LocalityResponse])),
    tags = ["locations"],
    operation_id = "listLocalities"
)]
#[get("/localities")]
pub async fn list_localities(
    state: web::Data<HttpState>,
    query: web::Query<ListLocalitiesQuery>,
) -> ApiResult<web::Json<Vec<LocalityResponse>>> {
    let search = query.into_inner().search;
    let localities = state.locations.list_localities(search).await?;
    Ok(web::Json(localities.into_iter().map(LocalityResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/localities",
    request_body = CreateLocalityRequest,
    responses(
        (status = 201, description = "Created", body = LocalityResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["locations"],
    operation_id = "createLocality"
)]
#[post("/localities")]
pub async fn create_locality(
    state: web::Data<HttpState>,
    payload: web::Json<CreateLocalityRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewLocality::try_from(payload.into_inner())?;
    let locality = state.locations.create_locality(request).await?;
    Ok(HttpResponse::Created().json(LocalityResponse::from(locality)))
}

#[utoipa::path(
    get,
    path = "/api/v1/stores",
    params(ListStoresQuery),
    responses(
        (status = 200, description = "Stores ordered by code", body = [StoreResponse]),
        (status = 400, description = "Invalid locality id", body = ErrorSchema)
    ),
    tags = ["locations"],
    operation_id = "listStores"
)]
#[get("/stores")]
pub async fn list_stores(
    state: web::Data<HttpState>,
    query: web::Query<ListStoresQuery>,
) -> ApiResult<web::Json<Vec<StoreResponse>>> {
    let locality = parse_optional_id(query.locality_id.as_deref(), LOCALITY_ID)?;
    let stores = state.locations.list_stores(locality).await?;
    Ok(web::Json(stores.into_iter().map(StoreResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Created", body = StoreResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Locality missing", body = ErrorSchema),
        (status = 409, description = "Store code already used", body = ErrorSchema)
    ),
    tags = ["locations"],
    operation_id = "createStore"
)]
#[post("/stores")]
pub async fn create_store(
    state: web::Data<HttpState>,
    payload: web::Json<CreateStoreRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewStore::try_from(payload.into_inner())?;
    let store = state.locations.create_store(request).await?;
    Ok(HttpResponse::Created().json(StoreResponse::from(store)))
}
