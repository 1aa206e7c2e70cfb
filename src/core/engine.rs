use crate::core::builder::build_quote;
use crate::core::{FormInput, GeneratedQuote, Storage};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::Validate;
use chrono::{Local, NaiveDate};
use std::sync::atomic::{AtomicU64, Ordering};

static SPOOL_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct QuoteEngine<S: Storage> {
    storage: S,
}

impl<S: Storage> QuoteEngine<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 以當下日期產生報價文件
    pub async fn run(&self, form: FormInput) -> Result<GeneratedQuote> {
        self.run_at(form, Local::now().date_naive()).await
    }

    pub async fn run_at(&self, form: FormInput, generated_on: NaiveDate) -> Result<GeneratedQuote> {
        form.validate()?;

        let file_name = form.output_file_name();
        tracing::info!(
            "Generating '{}' (logo: {}, itinerary: {}, images: {})",
            file_name,
            form.logo.is_some(),
            form.itinerary.is_some(),
            form.images.len()
        );

        // 組裝文件是純 CPU 工作，不佔用 async 執行緒
        let docx = tokio::task::spawn_blocking(move || build_quote(&form, generated_on))
            .await
            .map_err(|e| QuoteError::RenderError {
                message: format!("Document builder task failed: {}", e),
            })??;
        tracing::debug!("Packed document: {} bytes", docx.len());

        // 先寫入暫存檔、再讀回交付，最後刪除
        let spool = spool_name();
        self.storage.write_file(&spool, &docx).await?;
        let read_back = self.storage.read_file(&spool).await;
        if let Err(e) = self.storage.remove_file(&spool).await {
            tracing::warn!("Failed to remove spool file '{}': {}", spool, e);
        }
        let bytes = read_back?;

        tracing::info!("✅ Generated '{}' ({} bytes)", file_name, bytes.len());
        Ok(GeneratedQuote { file_name, bytes })
    }
}

fn spool_name() -> String {
    let seq = SPOOL_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "quote-{}-{}-{}.docx",
        std::process::id(),
        Local::now().timestamp_micros(),
        seq
    )
}
