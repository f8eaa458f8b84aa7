use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use itemmap_core::{Error, SearchConfiguration};
use itemmap_query::{BindError, Embedder, FieldClassification, QueryBinder, QueryDocument, UnknownFieldPolicy};
use itemmap_storage::StorageManager;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListIndexesQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterIndexRequest {
    field_configuration: FieldClassification,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigQuery {
    unknown_fields: Option<UnknownFieldPolicy>,
}

#[derive(Deserialize)]
struct RelatedRequest {
    record: serde_json::Value,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        storage: Arc<StorageManager>,
        embedder: Arc<dyn Embedder>,
        port: u16,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(embedder.clone()))
                .configure(RestApi::routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Route table, shared by the server and handler tests
    pub fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/indexes", web::get().to(list_indexes))
            .route("/indexes/{name}", web::get().to(get_index))
            .route("/indexes/{name}", web::put().to(register_index))
            .route("/indexes/{name}/config", web::get().to(get_config))
            .route("/indexes/{name}/config", web::put().to(save_config))
            .route("/indexes/{name}/query", web::get().to(get_query))
            .route("/indexes/{name}/query", web::put().to(save_query))
            .route("/indexes/{name}/related", web::post().to(related_query));
    }
}

fn error_response(e: &Error) -> HttpResponse {
    let body = json!({ "error": e.to_string() });
    match e {
        Error::IndexNotFound(_) => HttpResponse::NotFound().json(body),
        Error::InvalidConfig(_)
        | Error::DuplicateField(_)
        | Error::UnknownField(_)
        | Error::NotAnObject(_) => HttpResponse::BadRequest().json(body),
        _ => {
            tracing::error!(error = %e, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

async fn list_indexes(
    storage: web::Data<Arc<StorageManager>>,
    query: web::Query<ListIndexesQuery>,
) -> ActixResult<HttpResponse> {
    match storage.list_indexes(query.user_id.as_deref()) {
        Ok(indexes) => Ok(HttpResponse::Ok().json(json!({ "indexes": indexes }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_index(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    match storage.get_index(&name) {
        Ok(record) => Ok(HttpResponse::Ok().json(record)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn register_index(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
    req: web::Json<RegisterIndexRequest>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    match storage.register_index(&name, &req.file_name, &req.user_id, &req.field_configuration) {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({
            "result": true,
            "indexName": name,
            "message": format!("Index {} created successfully", name),
        }))),
        Ok(false) => Ok(HttpResponse::Ok().json(json!({
            "result": false,
            "indexName": name,
            "message": format!("Index {} already exists", name),
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_config(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
    query: web::Query<ConfigQuery>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    let policy = query.unknown_fields.unwrap_or_default();

    let parsed = match storage.load_configuration(&name, policy) {
        Ok(parsed) => parsed,
        Err(e) => return Ok(error_response(&e)),
    };
    let doc = match storage.load_query(&name) {
        Ok(doc) => doc,
        Err(e) => return Ok(error_response(&e)),
    };

    Ok(HttpResponse::Ok().json(json!({
        "config": parsed.config,
        "discoveredFields": parsed.discovered_fields,
        "query": doc,
    })))
}

async fn save_config(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
    req: web::Json<SearchConfiguration>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    let mut config = req.into_inner();

    if config.index_name.is_empty() {
        config.index_name = name.clone();
    } else if config.index_name != name {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": format!("Configuration is for index '{}', not '{}'", config.index_name, name)
        })));
    }

    let removed: Vec<String> = config.excluded_fields().into_iter().map(String::from).collect();
    match storage.save_configuration(&config) {
        Ok(doc) => Ok(HttpResponse::Ok().json(json!({
            "result": true,
            "query": doc,
            "removedFields": removed,
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_query(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();
    match storage.load_query(&name) {
        Ok(doc) => Ok(HttpResponse::Ok().json(doc)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn save_query(
    storage: web::Data<Arc<StorageManager>>,
    path: web::Path<String>,
    req: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    let doc = match QueryDocument::try_from(req.into_inner()) {
        Ok(doc) => doc,
        Err(e) => return Ok(error_response(&e)),
    };

    match storage.save_query(&name, &doc) {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "result": true }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn related_query(
    storage: web::Data<Arc<StorageManager>>,
    embedder: web::Data<Arc<dyn Embedder>>,
    path: web::Path<String>,
    req: web::Json<RelatedRequest>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    let template = match storage.load_query(&name) {
        Ok(doc) => doc,
        Err(e) => return Ok(error_response(&e)),
    };

    let binder = QueryBinder::new(embedder.get_ref().as_ref());
    match binder.bind(&template, &req.record) {
        Ok(body) => Ok(HttpResponse::Ok().json(json!({
            "indexName": name,
            "body": body,
        }))),
        Err(e @ BindError::RecordNotAnObject) => Ok(HttpResponse::BadRequest().json(json!({
            "error": e.to_string()
        }))),
        Err(e) => {
            tracing::error!(index = %name, error = %e, "binding related query failed");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            })))
        }
    }
}
