use actix_files::{Files, NamedFile};
use actix_multipart::Multipart;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{debug, error, info, warn};
use playercard_shared::{ErrorResponse, PlayerInfo, UploadResponse};
use std::path::PathBuf;

use crate::player::pipeline::PlayerInfoPipeline;
use crate::storage::upload_store::{UploadStore, UploadStoreError};

const SPORT_FIELD: &str = "sport";
const IMAGE_FIELD: &str = "player_image";

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: Option<PathBuf>) {
    cfg.service(web::resource("/upload").route(web::post().to(handle_upload)))
        .service(web::resource("/uploads/{filename}").route(web::get().to(uploaded_file)));

    if let Some(dir) = static_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

fn error_json(message: &str) -> ErrorResponse {
    ErrorResponse {
        error: message.to_string(),
    }
}

fn invalid_file() -> HttpResponse {
    HttpResponse::BadRequest().json(error_json("Invalid or missing file"))
}

fn too_large() -> HttpResponse {
    HttpResponse::PayloadTooLarge().json(error_json("File too large"))
}

async fn handle_upload(
    pipeline: web::Data<PlayerInfoPipeline>,
    store: web::Data<UploadStore>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let mut sport: Option<String> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition();
        let name = disposition.and_then(|cd| cd.get_name()).map(str::to_owned);
        let file_name = disposition
            .and_then(|cd| cd.get_filename())
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > store.max_size() {
                warn!("Rejecting upload field {:?}: larger than {} bytes", name, store.max_size());
                return Ok(too_large());
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some(SPORT_FIELD) => sport = Some(String::from_utf8_lossy(&data).into_owned()),
            Some(IMAGE_FIELD) => image = file_name.map(|file_name| (file_name, data)),
            _ => {}
        }
    }

    let Some((file_name, data)) = image else {
        warn!("Upload request without a usable {} field", IMAGE_FIELD);
        return Ok(invalid_file());
    };

    let record = match store.save(&file_name, &data).await {
        Ok(record) => record,
        Err(UploadStoreError::InvalidFormat) => {
            warn!("Rejecting upload with unsupported file name: {}", file_name);
            return Ok(invalid_file());
        }
        Err(UploadStoreError::FileTooLarge) => return Ok(too_large()),
        Err(e) => {
            error!("Failed to store upload {}: {:?}", file_name, e);
            return Ok(HttpResponse::InternalServerError().json(error_json("Failed to store file")));
        }
    };
    info!("Stored {} upload as {}", record.extension, record.filename);

    let sport_label = sport.clone().unwrap_or_default();
    let player_info = match pipeline.run(&record.path, &sport_label).await {
        Ok(report) => {
            info!(
                "Player report for {} ready: {} (id {}, {})",
                record.filename, report.player_name, report.player_id, report.team_name
            );
            debug!(
                "Latest game {:?}, averages {:?}",
                report.latest_game, report.averages
            );
            PlayerInfo::from(report)
        }
        Err(e) => {
            if e.is_upstream() {
                error!("Player lookup for {} failed upstream: {}", record.filename, e);
            } else {
                warn!("Player lookup for {} ended early: {}", record.filename, e);
            }
            PlayerInfo::from(e)
        }
    };

    Ok(HttpResponse::Ok().json(UploadResponse {
        sport,
        image_url: record.image_url(),
        player_info,
    }))
}

async fn uploaded_file(
    req: HttpRequest,
    store: web::Data<UploadStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let filename = path.into_inner();
    let file_path = match store.resolve(&filename) {
        Ok(file_path) => file_path,
        Err(_) => {
            warn!("Rejected upload lookup for {:?}", filename);
            return HttpResponse::BadRequest().json(error_json("Invalid file name"));
        }
    };

    match NamedFile::open_async(&file_path).await {
        Ok(file) => file.into_response(&req),
        Err(_) => HttpResponse::NotFound().json(error_json("File not found")),
    }
}
