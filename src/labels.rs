// 该文件是 Anbu （安步） 项目的一部分。
// src/labels.rs - 类别标签表
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{path::Path, sync::Arc};

use thiserror::Error;
use tracing::info;

const UNKNOWN_LABEL: &str = "unknown";

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("读取标签文件失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("标签文件为空")]
  Empty,
}

/// 类别标签表：有序的类别名列表，索引即类别 ID。
/// 启动时加载一次，之后只读；检测结果通过 `Arc<str>` 引用其中的条目而非拷贝。
#[derive(Debug, Clone)]
pub struct LabelTable {
  labels: Arc<[Arc<str>]>,
}

impl LabelTable {
  /// 从标签文件加载，每行一个类别名。
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LabelError> {
    let text = std::fs::read_to_string(path)?;
    let table = Self::from_lines(text.lines())?;
    info!("标签表加载完成: {} 个类别", table.len());
    Ok(table)
  }

  /// 由给定的行序列构建标签表，忽略空行与首尾空白。
  pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, LabelError> {
    let labels: Vec<Arc<str>> = lines
      .into_iter()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(Arc::from)
      .collect();

    if labels.is_empty() {
      return Err(LabelError::Empty);
    }

    Ok(Self {
      labels: labels.into(),
    })
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  /// 取类别名的共享引用；越界时退化为 "unknown"。
  pub fn name(&self, class_id: usize) -> Arc<str> {
    self
      .labels
      .get(class_id)
      .cloned()
      .unwrap_or_else(|| Arc::from(UNKNOWN_LABEL))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lines_are_trimmed_and_blank_lines_skipped() {
    let table = LabelTable::from_lines(["person", "  car ", "", "dog"]).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(&*table.name(0), "person");
    assert_eq!(&*table.name(1), "car");
    assert_eq!(&*table.name(2), "dog");
  }

  #[test]
  fn out_of_range_id_falls_back_to_unknown() {
    let table = LabelTable::from_lines(["person"]).unwrap();
    assert_eq!(&*table.name(7), "unknown");
  }

  #[test]
  fn empty_input_is_an_error() {
    assert!(matches!(
      LabelTable::from_lines(["", "  "]),
      Err(LabelError::Empty)
    ));
  }

  #[test]
  fn names_share_table_storage() {
    let table = LabelTable::from_lines(["person"]).unwrap();
    let a = table.name(0);
    let b = table.name(0);
    assert!(Arc::ptr_eq(&a, &b));
  }
}
