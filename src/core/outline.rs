//! Body-level view of a `.docx` file.
//!
//! Only the main story (`word/document.xml`) is read. Paragraphs that live
//! inside tables or text boxes are not body paragraphs; table cells are
//! collected as plain text per row.

use crate::utils::error::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph { style: Option<String>, text: String },
    Table { rows: Vec<Vec<String>> },
}

impl Block {
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Paragraph { text, .. } => Some(text),
            Block::Table { .. } => None,
        }
    }

    pub fn style(&self) -> Option<&str> {
        match self {
            Block::Paragraph { style, .. } => style.as_deref(),
            Block::Table { .. } => None,
        }
    }
}

/// 讀取文件主體的所有區塊（段落與表格），依文件順序
pub fn read_outline(docx: &[u8]) -> Result<Vec<Block>> {
    let xml = {
        let mut archive = ZipArchive::new(Cursor::new(docx))?;
        let mut part = archive.by_name("word/document.xml")?;
        let mut content = String::new();
        part.read_to_string(&mut content)?;
        content
    };
    parse_document_xml(&xml)
}

/// 只取主體段落的文字（不含表格內的段落）
pub fn read_paragraphs(docx: &[u8]) -> Result<Vec<String>> {
    Ok(read_outline(docx)?
        .into_iter()
        .filter_map(|block| match block {
            Block::Paragraph { text, .. } => Some(text),
            Block::Table { .. } => None,
        })
        .collect())
}

fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

#[derive(Default)]
struct WalkState {
    blocks: Vec<Block>,
    /// 目前開啟中的元素名稱
    stack: Vec<Vec<u8>>,
    /// 巢狀 w:p 的層數，文字方塊內的段落會大於 1
    paragraph_depth: usize,
    table_depth: usize,
    in_text: bool,
    body_paragraph: Option<(Option<String>, String)>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Option<String>,
}

impl WalkState {
    fn parent_is_body(&self) -> bool {
        self.stack.last().map(Vec::as_slice) == Some(b"w:body".as_slice())
    }

    fn parent_is_run(&self) -> bool {
        self.stack.last().map(Vec::as_slice) == Some(b"w:r".as_slice())
    }

    fn push_text(&mut self, text: &str) {
        if self.paragraph_depth != 1 {
            return;
        }
        if self.table_depth == 0 {
            if let Some((_, buf)) = self.body_paragraph.as_mut() {
                buf.push_str(text);
            }
        } else if self.table_depth == 1 {
            if let Some(cell) = self.cell.as_mut() {
                cell.push_str(text);
            }
        }
    }

    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => {
                if self.paragraph_depth == 0 && self.table_depth == 0 && self.parent_is_body() {
                    self.body_paragraph = Some((None, String::new()));
                } else if self.paragraph_depth == 0 && self.table_depth == 1 {
                    // 同一儲存格內的多個段落以換行分隔
                    if let Some(cell) = self.cell.as_mut() {
                        if !cell.is_empty() {
                            cell.push('\n');
                        }
                    }
                }
                self.paragraph_depth += 1;
            }
            b"w:tbl" => {
                if self.table_depth == 0 && self.paragraph_depth == 0 && self.parent_is_body() {
                    self.rows.clear();
                }
                self.table_depth += 1;
            }
            b"w:tr" if self.table_depth == 1 => self.row.clear(),
            b"w:tc" if self.table_depth == 1 => self.cell = Some(String::new()),
            b"w:t" => self.in_text = true,
            _ => {}
        }
        self.stack.push(e.name().as_ref().to_vec());
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:pStyle" if self.paragraph_depth == 1 => {
                if let (Some((style, _)), Some(val)) =
                    (self.body_paragraph.as_mut(), get_attr(e, b"w:val"))
                {
                    *style = Some(val);
                }
            }
            // w:tab 也出現在 w:pPr/w:tabs 的定位點定義裡，只處理 run 內的
            b"w:tab" if self.parent_is_run() => self.push_text("\t"),
            b"w:br" | b"w:cr" if self.parent_is_run() => self.push_text("\n"),
            // 空段落（<w:p/>）
            b"w:p" if self.paragraph_depth == 0 && self.table_depth == 0 && self.parent_is_body() => {
                self.blocks.push(Block::Paragraph {
                    style: None,
                    text: String::new(),
                });
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        self.stack.pop();
        match name {
            b"w:p" => {
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
                if self.paragraph_depth == 0 && self.table_depth == 0 {
                    if let Some((style, text)) = self.body_paragraph.take() {
                        self.blocks.push(Block::Paragraph { style, text });
                    }
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                if let Some(cell) = self.cell.take() {
                    self.row.push(cell);
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                let row = std::mem::take(&mut self.row);
                self.rows.push(row);
            }
            b"w:tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                if self.table_depth == 0 && self.paragraph_depth == 0 {
                    let rows = std::mem::take(&mut self.rows);
                    self.blocks.push(Block::Table { rows });
                }
            }
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }
}

fn parse_document_xml(xml: &str) -> Result<Vec<Block>> {
    let mut reader = Reader::from_str(xml);
    let mut state = WalkState::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => state.handle_start(&e),
            Event::Empty(e) => state.handle_empty(&e),
            Event::End(e) => state.handle_end(e.name().as_ref()),
            Event::Text(e) if state.in_text => {
                let text = e.unescape()?;
                state.push_text(&text);
            }
            Event::CData(e) if state.in_text => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                state.push_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!("Parsed {} body blocks from document.xml", state.blocks.len());
    Ok(state.blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading2"/></w:pPr>
      <w:r><w:t>DAY 1</w:t></w:r><w:r><w:t xml:space="preserve"> 哥本哈根</w:t></w:r>
    </w:p>
    <w:p><w:r><w:t>早餐后</w:t><w:tab/><w:t>出发</w:t><w:br/><w:t>晚宿酒店 &amp; 休息</w:t></w:r></w:p>
    <w:p/>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p><w:p><w:r><w:t>B1b</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
    <w:p>
      <w:r><w:t>正文</w:t></w:r>
      <w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>文字方塊</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r>
    </w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_body_blocks() {
        let blocks = parse_document_xml(SAMPLE).unwrap();
        assert_eq!(blocks.len(), 5);

        assert_eq!(blocks[0].style(), Some("Heading2"));
        assert_eq!(blocks[0].text(), Some("DAY 1 哥本哈根"));
        assert_eq!(blocks[1].text(), Some("早餐后\t出发\n晚宿酒店 & 休息"));
        assert_eq!(blocks[2].text(), Some(""));
        assert_eq!(
            blocks[3],
            Block::Table {
                rows: vec![vec!["A1".to_string(), "B1\nB1b".to_string()]]
            }
        );
        // 文字方塊內的段落不算主體段落
        assert_eq!(blocks[4].text(), Some("正文"));
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        assert!(read_outline(b"PK? nope").is_err());
    }
}
