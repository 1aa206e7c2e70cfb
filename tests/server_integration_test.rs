use anyhow::Result;
use docx_rs::{Docx, Paragraph, Run};
use image::{ImageFormat, Rgb, RgbImage};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::io::Cursor;
use tempfile::TempDir;
use trip_quote::core::outline::read_paragraphs;
use trip_quote::server::{self, AppState};
use trip_quote::{LocalStorage, QuoteEngine};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// 在隨機埠啟動伺服器，回傳 base URL 與工作目錄
async fn spawn_server(max_upload_bytes: usize) -> Result<(String, TempDir)> {
    let work_dir = TempDir::new()?;
    let storage = LocalStorage::new(work_dir.path().to_str().unwrap().to_string());
    let state = AppState::new(QuoteEngine::new(storage));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(server::serve(listener, state, max_upload_bytes));

    Ok((format!("http://{}", addr), work_dir))
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 90, 160]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn itinerary_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

fn file_part(bytes: Vec<u8>, name: &str, mime: &str) -> Part {
    Part::bytes(bytes).file_name(name.to_string()).mime_str(mime).unwrap()
}

#[tokio::test]
async fn test_form_page_and_health() -> Result<()> {
    let (base, _work_dir) = spawn_server(20 * 1024 * 1024).await?;
    let client = reqwest::Client::new();

    let page = client.get(format!("{}/", base)).send().await?;
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await?;
    assert!(html.contains("name=\"itinerary\""));
    assert!(html.contains("enctype=\"multipart/form-data\""));

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_default_submission_downloads_docx() -> Result<()> {
    let (base, work_dir) = spawn_server(20 * 1024 * 1024).await?;

    let form = Form::new()
        .text("title", "北欧 三国 12天游")
        .text("days", "12")
        .text("pax", "8");

    let response = reqwest::Client::new()
        .post(format!("{}/quote", base))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], DOCX_MIME);
    let disposition = response.headers()["content-disposition"].to_str()?.to_string();
    assert!(disposition.starts_with("attachment;"));
    // 空白換成底線後再做百分比編碼
    assert!(disposition.contains("%E5%8C%97%E6%AC%A7_%E4%B8%89%E5%9B%BD_12"));

    let bytes = response.bytes().await?;
    let paragraphs = read_paragraphs(&bytes)?;
    assert_eq!(paragraphs[0], "梦幻北欧 · 北欧 三国 12天游");
    assert_eq!(
        paragraphs
            .iter()
            .filter(|p| p.ends_with("｜示例日程"))
            .count(),
        3
    );
    assert!(paragraphs.last().unwrap().contains("适用人数：8人"));

    // 暫存檔在回應後已刪除
    let leftovers = std::fs::read_dir(work_dir.path())?.count();
    assert_eq!(leftovers, 0);

    Ok(())
}

#[tokio::test]
async fn test_uploads_replace_placeholder_days() -> Result<()> {
    let (base, _work_dir) = spawn_server(20 * 1024 * 1024).await?;

    let form = Form::new()
        .part("logo", file_part(png(3, 3), "logo.png", "image/png"))
        .part(
            "itinerary",
            file_part(
                itinerary_docx(&["DAY 1 哥本哈根", "DAY 2 奥斯陆"]),
                "days.docx",
                DOCX_MIME,
            ),
        )
        .part("images", file_part(png(4, 2), "fjord.png", "image/png"))
        .part("images", file_part(png(4, 1), "aurora.png", "image/png"));

    let response = reqwest::Client::new()
        .post(format!("{}/quote", base))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.bytes().await?;
    let paragraphs = read_paragraphs(&bytes)?;
    let start = paragraphs.iter().position(|p| p == "【每日行程详解】").unwrap();
    let end = paragraphs.iter().position(|p| p == "【报价明细】").unwrap();
    assert_eq!(
        &paragraphs[start + 1..end],
        &["DAY 1 哥本哈根", "", "DAY 2 奥斯陆", "", "📷 插图建议："]
    );

    Ok(())
}

#[tokio::test]
async fn test_empty_file_fields_are_ignored() -> Result<()> {
    let (base, _work_dir) = spawn_server(20 * 1024 * 1024).await?;

    // 瀏覽器未選檔案時送出的空欄位
    let form = Form::new()
        .part("logo", file_part(Vec::new(), "", "application/octet-stream"))
        .part("itinerary", file_part(Vec::new(), "", "application/octet-stream"));

    let response = reqwest::Client::new()
        .post(format!("{}/quote", base))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let paragraphs = read_paragraphs(&response.bytes().await?)?;
    assert!(paragraphs.iter().any(|p| p == "DAY 1｜示例日程"));

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_pax_is_rejected() -> Result<()> {
    let (base, _work_dir) = spawn_server(20 * 1024 * 1024).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/quote", base))
        .multipart(Form::new().text("pax", "150"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"].as_str().unwrap().contains("pax"));

    let response = client
        .post(format!("{}/quote", base))
        .multipart(Form::new().text("days", "abc"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(format!("{}/quote", base))
        .multipart(Form::new().part("logo", file_part(png(2, 2), "logo.gif", "image/gif")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_corrupt_upload_yields_generic_failure() -> Result<()> {
    let (base, work_dir) = spawn_server(20 * 1024 * 1024).await?;

    let form = Form::new().part(
        "images",
        file_part(b"not really a png".to_vec(), "broken.png", "image/png"),
    );
    let response = reqwest::Client::new()
        .post(format!("{}/quote", base))
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await?;
    assert!(!body["error"].as_str().unwrap().contains("broken.png"));
    assert_eq!(std::fs::read_dir(work_dir.path())?.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() -> Result<()> {
    let (base, _work_dir) = spawn_server(1024).await?;

    let form = Form::new().part("images", file_part(vec![0u8; 16 * 1024], "big.png", "image/png"));
    let response = reqwest::Client::new()
        .post(format!("{}/quote", base))
        .multipart(form)
        .send()
        .await?;

    assert!(response.status().is_client_error());

    Ok(())
}
