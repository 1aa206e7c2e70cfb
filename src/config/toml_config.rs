use crate::domain::model::{FormInput, Upload, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_required_field, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 離線產生報價文件用的 TOML 任務檔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub quote: FormInput,
    #[serde(default)]
    pub uploads: UploadsConfig,
    pub output: Option<OutputConfig>,
    /// 相對路徑的基準目錄（任務檔所在目錄）
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadsConfig {
    pub logo: Option<String>,
    pub itinerary: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.as_ref().parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AGENT_PHONE})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| QuoteError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_path(&self) -> Result<&str> {
        Ok(validate_required_field("output", &self.output)?.path.as_str())
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(path).is_relative() => base.join(path),
            _ => PathBuf::from(path),
        }
    }

    /// 讀入所有上傳檔案，組成一份表單輸入
    pub async fn load_form_input(&self) -> Result<FormInput> {
        let mut form = self.quote.clone();

        if let Some(logo) = &self.uploads.logo {
            form.logo = Some(self.load_upload(logo).await?);
        }
        if let Some(itinerary) = &self.uploads.itinerary {
            form.itinerary = Some(self.load_upload(itinerary).await?);
        }
        for image in &self.uploads.images {
            form.images.push(self.load_upload(image).await?);
        }

        Ok(form)
    }

    async fn load_upload(&self, path: &str) -> Result<Upload> {
        let full_path = self.resolve(path);
        tracing::debug!("Loading upload from {}", full_path.display());
        let bytes = tokio::fs::read(&full_path).await?;
        let file_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        Ok(Upload::new(file_name, bytes))
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("output.path", self.output_path()?)?;

        if let Some(logo) = &self.uploads.logo {
            validate_file_extensions("uploads.logo", &[logo.as_str()], IMAGE_EXTENSIONS)?;
        }
        if let Some(itinerary) = &self.uploads.itinerary {
            validate_file_extensions(
                "uploads.itinerary",
                &[itinerary.as_str()],
                DOCUMENT_EXTENSIONS,
            )?;
        }
        let images: Vec<&str> = self.uploads.images.iter().map(String::as_str).collect();
        validate_file_extensions("uploads.images", &images, IMAGE_EXTENSIONS)?;

        self.quote.validate()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
