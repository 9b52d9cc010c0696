//! TableLayout - 桌台布局
//!
//! Floor-plan positions and the edit lock. Purely for rendering continuity;
//! nothing here feeds table status.

use crate::error::{FloorError, FloorResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 布局文件名
pub const LAYOUT_FILE: &str = "table-layout.json";

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<LayoutError> for FloorError {
    fn from(err: LayoutError) -> Self {
        FloorError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    #[default]
    Square,
    Round,
    Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TablePlacement {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub shape: TableShape,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    /// 锁定后不可拖动
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub placements: BTreeMap<String, TablePlacement>,
}

impl TableLayout {
    fn ensure_unlocked(&self) -> FloorResult<()> {
        if self.locked {
            return Err(FloorError::Validation("table layout is locked".to_string()));
        }
        Ok(())
    }

    /// Move a table, keeping its shape
    pub fn move_table(&mut self, table_id: &str, x: f64, y: f64) -> FloorResult<()> {
        self.ensure_unlocked()?;
        if !x.is_finite() || !y.is_finite() {
            return Err(FloorError::Validation(format!(
                "invalid position ({}, {}) for table {}",
                x, y, table_id
            )));
        }
        let placement = self.placements.entry(table_id.to_string()).or_default();
        placement.x = x;
        placement.y = y;
        Ok(())
    }

    pub fn set_shape(&mut self, table_id: &str, shape: TableShape) -> FloorResult<()> {
        self.ensure_unlocked()?;
        self.placements.entry(table_id.to_string()).or_default().shape = shape;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn placement(&self, table_id: &str) -> Option<&TablePlacement> {
        self.placements.get(table_id)
    }

    /// Forget placements of tables that no longer exist
    pub fn prune<'a>(&mut self, table_ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = table_ids.into_iter().collect();
        self.placements.retain(|id, _| keep.contains(id.as_str()));
    }
}

/// JSON file store for [`TableLayout`]
#[derive(Debug, Clone)]
pub struct LayoutStore {
    /// 布局文件路径: {work_dir}/table-layout.json
    file_path: PathBuf,
}

impl LayoutStore {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            file_path: work_dir.join(LAYOUT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 从文件加载; 文件不存在时返回默认布局
    pub fn load(&self) -> Result<TableLayout, LayoutError> {
        if !self.file_path.exists() {
            return Ok(TableLayout::default());
        }
        let content = std::fs::read_to_string(&self.file_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存到文件
    pub fn save(&self, layout: &TableLayout) -> Result<(), LayoutError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(layout)?;
        std::fs::write(&self.file_path, content)?;
        tracing::debug!(path = %self.file_path.display(), "table layout saved");
        Ok(())
    }
}
