// ==========================================
// 度假村报价表识别引擎 - 工作簿适配器
// ==========================================
// 支持: calamine 已加载的 Range<Data> + 合并区域 Dimensions
// 说明: 保留绝对坐标（Range 起点之前补空行/空列）
// ==========================================

use crate::domain::grid::{CellGrid, CellRange, CellValue, MergeRange, Worksheet};
use crate::importer::error::RecognitionResult;
use calamine::{Data, Dimensions, Range};

/// 单个 calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) if f.is_finite() => CellValue::Number(*f),
        Data::Float(_) => CellValue::Empty,
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // 日期按 Excel 序列号保留为数字
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.trim().to_string())
            }
        }
    }
}

/// calamine Range → CellGrid（绝对坐标）
pub fn grid_from_calamine(range: &Range<Data>) -> CellGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for data_row in range.rows() {
        let mut row = vec![CellValue::Empty; col_offset];
        row.extend(data_row.iter().map(convert_cell));
        rows.push(row);
    }

    CellGrid::new(rows)
}

/// 合并区域 Dimensions → MergeRange（锚点值取自网格）
///
/// # 返回
/// - Err: 合并区域越界或起止颠倒（上游契约错误）
pub fn merges_from_dimensions(
    grid: &CellGrid,
    dimensions: &[Dimensions],
) -> RecognitionResult<Vec<MergeRange>> {
    let mut merges = Vec::with_capacity(dimensions.len());
    for dim in dimensions {
        let range = CellRange::new(
            dim.start.0 as usize,
            dim.start.1 as usize,
            dim.end.0 as usize,
            dim.end.1 as usize,
        );
        let anchor = grid.get(range.start_row, range.start_col).clone();
        let merge = MergeRange::new(range, anchor);
        grid.check_merge(&merge)?;
        merges.push(merge);
    }
    Ok(merges)
}

/// 一次性构造 Worksheet
pub fn worksheet_from_calamine(
    name: &str,
    range: &Range<Data>,
    merged_regions: &[Dimensions],
) -> RecognitionResult<Worksheet> {
    let grid = grid_from_calamine(range);
    let merges = merges_from_dimensions(&grid, merged_regions)?;
    Ok(Worksheet::new(name, grid).with_merges(merges))
}
