use super::AppState;
use crate::domain::model::{FormInput, Upload, DOCX_MIME_TYPE};
use crate::utils::error::{ErrorCategory, QuoteError, Result};
use crate::utils::validation::parse_number;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;

const FORM_PAGE: &str = include_str!("form.html");

pub async fn index() -> Html<&'static str> {
    Html(FORM_PAGE)
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// 接收表單、產生文件並以附件下載回應
pub async fn generate_quote(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_form(multipart).await?;
    let quote = state.engine.run(form).await?;

    let headers = [
        (header::CONTENT_TYPE, DOCX_MIME_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&quote.file_name),
        ),
    ];
    Ok((headers, quote.bytes).into_response())
}

fn upload_error(e: MultipartError) -> QuoteError {
    QuoteError::UploadError {
        message: e.body_text(),
    }
}

/// 解析 multipart 表單；沒送出的欄位保留預設值
pub async fn read_form(mut multipart: Multipart) -> Result<FormInput> {
    let mut form = FormInput::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "logo" | "itinerary" | "images" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(upload_error)?;
                // 瀏覽器在未選擇檔案時仍會送出空的檔案欄位
                if bytes.is_empty() {
                    continue;
                }
                tracing::debug!("Received {} upload '{}' ({} bytes)", name, file_name, bytes.len());
                let upload = Upload::new(file_name, bytes.to_vec());
                match name.as_str() {
                    "logo" => form.logo = Some(upload),
                    "itinerary" => form.itinerary = Some(upload),
                    _ => form.images.push(upload),
                }
            }
            _ => {
                let value = field.text().await.map_err(upload_error)?;
                apply_text_field(&mut form, &name, value)?;
            }
        }
    }

    Ok(form)
}

fn apply_text_field(form: &mut FormInput, name: &str, value: String) -> Result<()> {
    match name {
        "title" => form.title = value,
        "origin" => form.origin = value,
        "date" => form.date = value,
        "days" => form.days = parse_number("days", &value)?,
        "pax" => form.pax = parse_number("pax", &value)?,
        "destinations" => form.destinations = value,
        "hotel" => form.hotel = value,
        "features" => form.features = value,
        "price" => form.price = value,
        other => tracing::debug!("Ignoring unknown form field '{}'", other),
    }
    Ok(())
}

/// `filename` 給只認 ASCII 的客戶端，`filename*` 帶完整的 UTF-8 檔名
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = url::form_urlencoded::byte_serialize(file_name.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A");

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Input => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(
                "❌ Quote generation failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::warn!("Rejected submission: {}", self);
        }

        let body = Json(json!({
            "error": self.user_friendly_message(),
            "suggestion": self.recovery_suggestion(),
        }));
        (status, body).into_response()
    }
}
