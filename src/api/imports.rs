use actix_web::{post, web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::session::CurrentUser;
use crate::api::state::AppState;
use crate::error::KithError;
use crate::extract::{self, ExtractedContact, FaceRegion, PixelFormat};
use crate::ops::import_ops;

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct FaceRegionRequest {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: PixelFormat,
    /// Raw pixel bytes, base64 encoded.
    pub pixels: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCommit {
    pub contacts: Vec<ExtractedContact>,
    #[serde(default = "default_skip_duplicates")]
    pub skip_duplicates: bool,
}

fn default_skip_duplicates() -> bool {
    true
}

#[post("/import/vcard")]
pub async fn import_vcard(
    _user: CurrentUser,
    payload: web::Json<TextPayload>,
) -> ApiResult<web::Json<Vec<ExtractedContact>>> {
    let contacts = extract::parse_vcards(&payload.text)?;
    Ok(web::Json(contacts))
}

#[post("/import/text")]
pub async fn import_text(
    _user: CurrentUser,
    payload: web::Json<TextPayload>,
) -> ApiResult<web::Json<ExtractedContact>> {
    let contact = extract::parse_ocr_text(&payload.text)?;
    Ok(web::Json(contact))
}

#[post("/import/face-region")]
pub async fn face_region(
    state: web::Data<AppState>,
    _user: CurrentUser,
    payload: web::Json<FaceRegionRequest>,
) -> ApiResult<web::Json<FaceRegion>> {
    let req = payload.into_inner();
    let pixels = STANDARD
        .decode(req.pixels.as_bytes())
        .map_err(|e| KithError::invalid("pixels", format!("is not valid base64: {}", e)))?;
    let region = state
        .blocking(move || extract::select_face_region(&pixels, req.width, req.height, req.format))
        .await?;
    Ok(web::Json(region))
}

/// The extraction endpoints above only preview; nothing is stored until the
/// reviewed contacts come back here.
#[post("/import/commit")]
pub async fn commit_import(
    state: web::Data<AppState>,
    user: CurrentUser,
    payload: web::Json<ImportCommit>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let report = state
        .with_conn(move |conn| {
            import_ops::import_contacts(conn, user.0, req.contacts, req.skip_duplicates)
        })
        .await?;
    Ok(HttpResponse::Created().json(report))
}
