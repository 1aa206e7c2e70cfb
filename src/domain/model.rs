use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_range, Validate};
use serde::{Deserialize, Serialize};

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["docx"];

const FILE_NAME_SUFFIX: &str = "_报价方案.docx";

/// 一個已完整讀入記憶體的上傳檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// 單次表單提交的全部內容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub title: String,
    pub origin: String,
    pub date: String,
    pub days: u32,
    pub pax: u32,
    pub destinations: String,
    pub hotel: String,
    pub features: String,
    pub price: String,
    #[serde(skip)]
    pub logo: Option<Upload>,
    #[serde(skip)]
    pub itinerary: Option<Upload>,
    #[serde(skip)]
    pub images: Vec<Upload>,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            title: "北欧三国12天游".to_string(),
            origin: "深圳（香港起飞）".to_string(),
            date: "2025年8月15日".to_string(),
            days: 12,
            pax: 10,
            destinations: "丹麦、挪威、芬兰".to_string(),
            hotel: "四星/部分升级五星".to_string(),
            features: "峡湾游船、极光玻璃屋、圣诞老人村".to_string(),
            price: "约17100元/人".to_string(),
            logo: None,
            itinerary: None,
            images: Vec::new(),
        }
    }
}

impl FormInput {
    /// 下載檔名：標題中的空白換成底線，再加固定後綴
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.title.replace(' ', "_"), FILE_NAME_SUFFIX)
    }
}

impl Validate for FormInput {
    fn validate(&self) -> Result<()> {
        validate_range("days", self.days, 1, 30)?;
        validate_range("pax", self.pax, 1, 100)?;

        // 沒有檔名的上傳只能靠解碼檢查內容
        validate_file_extensions("logo", &named(self.logo.iter()), IMAGE_EXTENSIONS)?;
        validate_file_extensions(
            "itinerary",
            &named(self.itinerary.iter()),
            DOCUMENT_EXTENSIONS,
        )?;
        validate_file_extensions("images", &named(self.images.iter()), IMAGE_EXTENSIONS)?;

        Ok(())
    }
}

fn named<'a>(uploads: impl Iterator<Item = &'a Upload>) -> Vec<&'a str> {
    uploads
        .map(|u| u.file_name.as_str())
        .filter(|name| !name.is_empty())
        .collect()
}

/// 報價明細表的一列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLineItem {
    pub item: &'static str,
    pub unit_price: &'static str,
    pub description: &'static str,
}

// 固定四列，與表單的「预计报价」無關
pub const PRICE_LINE_ITEMS: [PriceLineItem; 4] = [
    PriceLineItem {
        item: "国际机票",
        unit_price: "6800",
        description: "含税多段",
    },
    PriceLineItem {
        item: "住宿费用",
        unit_price: "5800",
        description: "四星起步",
    },
    PriceLineItem {
        item: "交通导服",
        unit_price: "1800",
        description: "含用车/导游/服务费",
    },
    PriceLineItem {
        item: "门票餐食",
        unit_price: "2700",
        description: "全含套餐",
    },
];

/// 產生完成、等待交付的文件
#[derive(Debug, Clone)]
pub struct GeneratedQuote {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name_replaces_spaces() {
        let form = FormInput {
            title: "Iceland Ring Road 8D".to_string(),
            ..FormInput::default()
        };
        assert_eq!(form.output_file_name(), "Iceland_Ring_Road_8D_报价方案.docx");
    }

    #[test]
    fn test_default_form_is_valid() {
        assert!(FormInput::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_counts_are_rejected() {
        let form = FormInput {
            days: 31,
            ..FormInput::default()
        };
        assert!(form.validate().is_err());

        let form = FormInput {
            pax: 0,
            ..FormInput::default()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_upload_types_follow_form_filters() {
        let form = FormInput {
            logo: Some(Upload::new("logo.gif", vec![])),
            ..FormInput::default()
        };
        assert!(form.validate().is_err());

        let form = FormInput {
            itinerary: Some(Upload::new("days.pdf", vec![])),
            ..FormInput::default()
        };
        assert!(form.validate().is_err());

        let form = FormInput {
            images: vec![Upload::new("a.png", vec![]), Upload::new("b.jpeg", vec![])],
            ..FormInput::default()
        };
        assert!(form.validate().is_ok());

        let form = FormInput {
            logo: Some(Upload::new("", vec![1, 2, 3])),
            ..FormInput::default()
        };
        assert!(form.validate().is_ok());
    }
}
