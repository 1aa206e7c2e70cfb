use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Document rendering error: {message}")]
    RenderError { message: String },

    #[error("Upload error: {message}")]
    UploadError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidFieldError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },
}

pub type Result<T> = std::result::Result<T, QuoteError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 使用者輸入不合法，表單層應拒絕
    Input,
    /// 上傳檔案或文件產生失敗
    Generation,
    /// 設定檔或命令列參數問題
    Configuration,
    /// 本機檔案系統
    System,
}

impl QuoteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuoteError::InvalidFieldError { .. }
            | QuoteError::MissingFieldError { .. }
            | QuoteError::UploadError { .. } => ErrorCategory::Input,
            QuoteError::ZipError(_)
            | QuoteError::XmlError(_)
            | QuoteError::ImageError(_)
            | QuoteError::RenderError { .. } => ErrorCategory::Generation,
            QuoteError::ConfigError { .. } | QuoteError::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            QuoteError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Generation => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 輸入類錯誤的訊息可直接顯示；生成類錯誤只回傳通用訊息，細節留在日誌
    pub fn user_friendly_message(&self) -> String {
        match self {
            QuoteError::InvalidFieldError { field, reason, .. } => {
                format!("欄位「{}」不正確：{}", field, reason)
            }
            QuoteError::MissingFieldError { field } => format!("缺少必要欄位「{}」", field),
            QuoteError::UploadError { message } => format!("上傳檔案有誤：{}", message),
            QuoteError::ConfigError { message } => format!("設定錯誤：{}", message),
            QuoteError::ConfigValidationError { field, message } => {
                format!("設定「{}」不正確：{}", field, message)
            }
            _ => "报价方案生成失败，请检查上传的文件后重试".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "請修正表單欄位後重新提交",
            ErrorCategory::Generation => "請確認上傳的 Word 文件與圖片（PNG/JPG）沒有損壞",
            ErrorCategory::Configuration => "請檢查命令列參數或 TOML 設定檔",
            ErrorCategory::System => "請確認工作目錄存在且可寫入",
        }
    }
}
