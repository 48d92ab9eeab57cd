// ==========================================
// 度假村报价表识别引擎 - 单元格网格模型
// ==========================================
// 职责: 工作表的不可变快照（行 × 列）+ 合并区域
// 红线: 网格创建后不可修改，所有识别只读
// ==========================================

use crate::importer::error::{RecognitionError, RecognitionResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值（封闭和类型）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 由原始字符串构造：空白 → Empty，纯数字 → Number，其余 → Text
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 仅文本单元格返回内容（数字不参与关键字匹配）
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 原始显示文本（整数不带小数点）
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

// ==========================================
// CellRef - 单元格坐标（0 基）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    /// Excel 风格引用（A1、B2、AA10）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut col = self.col + 1;
        while col > 0 {
            let rem = (col - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            col = (col - 1) / 26;
        }
        let name: String = letters.into_iter().rev().collect();
        write!(f, "{}{}", name, self.row + 1)
    }
}

// ==========================================
// CellRange - 矩形区域（闭区间）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl CellRange {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// 退化区域（网格原点）
    pub fn origin() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    pub fn row_count(&self) -> usize {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    /// 夹紧到网格尺寸内（空网格夹紧到原点）
    pub fn clamp_to(&self, height: usize, width: usize) -> Self {
        let max_row = height.saturating_sub(1);
        let max_col = width.saturating_sub(1);
        let end_row = self.end_row.min(max_row);
        let end_col = self.end_col.min(max_col);
        Self {
            start_row: self.start_row.min(end_row),
            start_col: self.start_col.min(end_col),
            end_row,
            end_col,
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            CellRef::new(self.start_row, self.start_col),
            CellRef::new(self.end_row, self.end_col)
        )
    }
}

// ==========================================
// MergeRange - 合并区域（锚点值广播）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRange {
    pub range: CellRange,
    /// 锚点（左上角）单元格的值
    pub value: CellValue,
}

impl MergeRange {
    pub fn new(range: CellRange, value: CellValue) -> Self {
        Self { range, value }
    }
}

// ==========================================
// CellGrid - 工作表网格快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellGrid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        Self { rows, width }
    }

    /// 从字符串二维数组构造（测试与上游适配常用）
    pub fn from_strings<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|v| CellValue::from_raw(v.as_ref())).collect())
                .collect(),
        )
    }

    /// 从内存中的 CSV 文本构造网格（无表头，允许行长度不一致）
    pub fn from_csv_str(text: &str) -> RecognitionResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(CellValue::from_raw).collect());
        }
        Ok(Self::new(rows))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(CellValue::is_empty))
    }

    /// 越界读取返回 Empty
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text_at(&self, row: usize, col: usize) -> Option<&str> {
        self.get(row, col).as_text().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// 行内最后一个非空列
    pub fn last_filled_col(&self, row: usize) -> Option<usize> {
        self.row(row).iter().rposition(|c| !c.is_empty())
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        self.row(row).iter().all(CellValue::is_empty)
    }

    /// 校验合并区域（上游契约错误才返回 Err）
    pub fn check_merge(&self, merge: &MergeRange) -> RecognitionResult<()> {
        let r = merge.range;
        if r.start_row > r.end_row || r.start_col > r.end_col {
            return Err(RecognitionError::InvalidMergeRange {
                range: r.to_string(),
            });
        }
        if r.end_row >= self.height() || r.end_col >= self.width() {
            return Err(RecognitionError::MergeOutOfBounds {
                range: r.to_string(),
                height: self.height(),
                width: self.width(),
            });
        }
        Ok(())
    }
}

// ==========================================
// Worksheet / Workbook - 上游提供的物化工作簿
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Worksheet {
    pub name: String,
    pub grid: CellGrid,
    #[serde(default)]
    pub merges: Vec<MergeRange>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, grid: CellGrid) -> Self {
        Self {
            name: name.into(),
            grid,
            merges: Vec::new(),
        }
    }

    pub fn with_merges(mut self, merges: Vec<MergeRange>) -> Self {
        self.merges = merges;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Worksheet>) -> Self {
        Self { sheets }
    }
}
