use crate::domain::grid::{CellGrid, CellValue, MergeRange};
use crate::importer::error::RecognitionResult;
use std::collections::HashMap;

// ==========================================
// MergeLookup - 合并区域广播视图
// ==========================================
// 锚点值广播到区域内每个坐标；网格与合并表均只读
pub(super) struct MergeLookup<'a> {
    grid: &'a CellGrid,
    covered: HashMap<(usize, usize), &'a CellValue>,
}

impl<'a> MergeLookup<'a> {
    /// 校验并展开合并区域
    ///
    /// # 返回
    /// - Err: 合并区域越界或起止颠倒
    pub(super) fn build(grid: &'a CellGrid, merges: &'a [MergeRange]) -> RecognitionResult<Self> {
        let mut covered = HashMap::new();
        for merge in merges {
            grid.check_merge(merge)?;
            let r = merge.range;
            for row in r.start_row..=r.end_row {
                for col in r.start_col..=r.end_col {
                    covered.entry((row, col)).or_insert(&merge.value);
                }
            }
        }
        Ok(Self { grid, covered })
    }

    /// (单元格值, 是否来自合并区域)
    pub(super) fn get(&self, row: usize, col: usize) -> (&'a CellValue, bool) {
        match self.covered.get(&(row, col)) {
            Some(value) => (*value, true),
            None => (self.grid.get(row, col), false),
        }
    }
}
