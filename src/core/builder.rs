//! Quote document assembly.
//!
//! Sections are appended in a fixed order: header logo, cover, daily
//! itinerary, price table, footer. Every user-supplied string is copied
//! verbatim into the document.

use crate::core::images::{prepare_image, PreparedImage, ILLUSTRATION_WIDTH_EMU, LOGO_WIDTH_EMU};
use crate::core::outline::read_paragraphs;
use crate::domain::model::{FormInput, Upload, PRICE_LINE_ITEMS};
use crate::utils::error::{QuoteError, Result};
use chrono::NaiveDate;
use docx_rs::{
    BreakType, Docx, Header, Paragraph, Pic, Run, RunFonts, Style, StyleType, Table, TableCell,
    TableRow,
};
use std::io::Cursor;

pub const BASE_FONT: &str = "微软雅黑";
/// 11pt，docx 以半點為單位
pub const BASE_FONT_HALF_POINTS: usize = 22;

pub const BRAND_PREFIX: &str = "梦幻北欧";
pub const PLACEHOLDER_DAYS: usize = 3;

const HEADING_STYLES: [(&str, &str, usize); 3] = [
    ("Heading1", "heading 1", 32),
    ("Heading2", "heading 2", 26),
    ("Heading3", "heading 3", 24),
];

pub struct QuoteBuilder {
    docx: Docx,
}

impl QuoteBuilder {
    /// 建立文件並設定預設字型（西文與東亞字型槽位相同）
    pub fn initialize() -> Self {
        let fonts = RunFonts::new()
            .ascii(BASE_FONT)
            .hi_ansi(BASE_FONT)
            .east_asia(BASE_FONT)
            .cs(BASE_FONT);

        let mut docx = Docx::new()
            .default_fonts(fonts)
            .default_size(BASE_FONT_HALF_POINTS);

        for (id, name, size) in HEADING_STYLES {
            docx = docx.add_style(
                Style::new(id, StyleType::Paragraph)
                    .name(name)
                    .size(size)
                    .bold(),
            );
        }

        Self { docx }
    }

    /// 有 LOGO 時放進頁首，否則不動
    pub fn attach_logo(mut self, logo: Option<&Upload>) -> Result<Self> {
        if let Some(logo) = logo {
            tracing::debug!("Attaching logo '{}' to page header", logo.file_name);
            let image = prepare_image(&logo.bytes, LOGO_WIDTH_EMU)?;
            let header =
                Header::new().add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic(image))));
            self.docx = self.docx.header(header);
        }
        Ok(self)
    }

    pub fn render_cover(mut self, form: &FormInput) -> Self {
        self.docx = self
            .docx
            .add_paragraph(heading(1, &format!("{} · {}", BRAND_PREFIX, form.title)))
            .add_paragraph(text_paragraph(&format!(
                "{}｜峡湾极光｜纯净童话｜全程纯玩",
                form.destinations
            )))
            .add_paragraph(heading(2, "【产品亮点】"))
            .add_paragraph(multiline_paragraph(&[
                format!("✓ 一次游览：{}", form.destinations),
                format!("✓ 特色项目：{}", form.features),
                format!("✓ 酒店安排：{}", form.hotel),
                "✓ 全程无购物无自费".to_string(),
                format!("✓ 出发时间：{}｜{}人小团", form.date, form.pax),
            ]));
        self
    }

    /// 有上傳行程文件就逐段複製（只取文字，每段後接一個空段落），否則放三天示例行程；
    /// 插圖依上傳順序排在同一段落內
    pub fn render_daily(mut self, itinerary: Option<&Upload>, images: &[Upload]) -> Result<Self> {
        self.docx = self.docx.add_paragraph(heading(2, "【每日行程详解】"));

        match itinerary {
            Some(upload) => {
                let paragraphs = read_paragraphs(&upload.bytes)?;
                tracing::debug!(
                    "Copying {} paragraphs from itinerary '{}'",
                    paragraphs.len(),
                    upload.file_name
                );
                for text in paragraphs {
                    self.docx = self
                        .docx
                        .add_paragraph(text_paragraph(&text))
                        .add_paragraph(Paragraph::new());
                }
            }
            None => {
                for day in 1..=PLACEHOLDER_DAYS {
                    self.docx = self
                        .docx
                        .add_paragraph(heading(3, &format!("DAY {}｜示例日程", day)))
                        .add_paragraph(text_paragraph("🚌 行程安排：参考景点游览 + 城市穿越 + 用车说明"))
                        .add_paragraph(text_paragraph("📍 景点亮点："))
                        .add_paragraph(multiline_paragraph(&["• 核心景点一", "• 景点二", "• 景点三"]))
                        .add_paragraph(text_paragraph("🍽 餐食与住宿：中餐 + 晚餐 + 四星酒店"));
                }
            }
        }

        if !images.is_empty() {
            let mut paragraph = text_paragraph("📷 插图建议：");
            for upload in images {
                let image = prepare_image(&upload.bytes, ILLUSTRATION_WIDTH_EMU)?;
                paragraph = paragraph.add_run(Run::new().add_image(pic(image)));
            }
            tracing::debug!("Laid out {} illustration images", images.len());
            self.docx = self.docx.add_paragraph(paragraph);
        }

        Ok(self)
    }

    /// 固定表頭與四列固定內容，不引用任何表單欄位
    pub fn render_price_table(mut self) -> Self {
        let mut rows = vec![TableRow::new(vec![
            table_cell("费用项目"),
            table_cell("单价（元/人）"),
            table_cell("说明"),
        ])];
        for line in PRICE_LINE_ITEMS {
            rows.push(TableRow::new(vec![
                table_cell(line.item),
                table_cell(line.unit_price),
                table_cell(line.description),
            ]));
        }

        self.docx = self
            .docx
            .add_paragraph(heading(2, "【报价明细】"))
            .add_table(Table::new(rows).set_grid(vec![2600, 2200, 4200]));
        self
    }

    pub fn render_footer(mut self, form: &FormInput, generated_on: NaiveDate) -> Self {
        self.docx = self
            .docx
            .add_paragraph(heading(2, "【费用包含】"))
            .add_paragraph(text_paragraph("机票、酒店、导游、交通、门票、签证、保险等"))
            .add_paragraph(heading(2, "【费用不含】"))
            .add_paragraph(text_paragraph("护照办理、单房差、个人消费"))
            .add_paragraph(heading(2, "【报价信息】"))
            .add_paragraph(multiline_paragraph(&[
                format!("报价：{}", form.price),
                format!("适用人数：{}人", form.pax),
                format!("出发时间：{}", form.date),
                format!("报价时间：{}", generated_on.format("%Y年%m月")),
                "联系人：小游".to_string(),
                "电话：138-0000-0000".to_string(),
            ]));
        self
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.docx
            .build()
            .pack(&mut cursor)
            .map_err(|e| QuoteError::RenderError {
                message: format!("Failed to pack docx: {}", e),
            })?;
        Ok(cursor.into_inner())
    }
}

/// 依固定順序執行所有步驟，回傳 .docx 位元組
pub fn build_quote(form: &FormInput, generated_on: NaiveDate) -> Result<Vec<u8>> {
    QuoteBuilder::initialize()
        .attach_logo(form.logo.as_ref())?
        .render_cover(form)
        .render_daily(form.itinerary.as_ref(), &form.images)?
        .render_price_table()
        .render_footer(form, generated_on)
        .finish()
}

fn heading(level: usize, text: &str) -> Paragraph {
    text_paragraph(text).style(&format!("Heading{}", level))
}

fn text_paragraph(text: &str) -> Paragraph {
    if text.is_empty() {
        return Paragraph::new();
    }
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// 多行內容放在同一段落，以換行分隔
fn multiline_paragraph<S: AsRef<str>>(lines: &[S]) -> Paragraph {
    let mut run = Run::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line.as_ref());
    }
    Paragraph::new().add_run(run)
}

fn table_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(text_paragraph(text))
}

fn pic(image: PreparedImage) -> Pic {
    Pic::new_with_dimensions(image.png, image.width_px, image.height_px)
        .size(image.width_emu, image.height_emu)
}
