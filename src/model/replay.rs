// 该文件是 Anbu （安步） 项目的一部分。
// src/model/replay.rs - 张量文件回放引擎
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{
  fs::File,
  io::BufReader,
  path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  model::Engine,
  tensor::{OutputShape, RawOutput, TensorError},
};

/// 回放文件格式：{"num_classes": N, "num_anchors": M, "data": [...]}
#[derive(Debug, Deserialize)]
struct TensorFile {
  num_classes: usize,
  num_anchors: usize,
  data: Vec<f32>,
}

#[derive(Error, Debug)]
pub enum ReplayError {
  #[error("读取张量文件失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("解析张量文件失败: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("张量内容无效: {0}")]
  Tensor(#[from] TensorError),
  #[error("张量形状不一致: 期望 {expected:?}, 实际 {actual:?}")]
  ShapeMismatch {
    expected: OutputShape,
    actual: OutputShape,
  },
}

/// 把保存在 JSON 文件中的输出张量当作推理结果回放。
/// 用于离线调试与测试，替代真实的 NPU/解释器引擎。
pub struct ReplayEngine {
  shape: OutputShape,
}

impl ReplayEngine {
  /// 以第一份张量文件声明的形状创建回放引擎。
  /// 文件不可读或格式错误属于配置错误，直接上抛。
  pub fn probe(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
    let file = load(path.as_ref())?;
    let shape = OutputShape::new(file.num_classes, file.num_anchors);
    info!(
      "回放引擎就绪: {} 类别, {} 锚点",
      shape.num_classes, shape.num_anchors
    );
    Ok(Self { shape })
  }

  pub fn with_shape(shape: OutputShape) -> Self {
    Self { shape }
  }
}

fn load(path: &Path) -> Result<TensorFile, ReplayError> {
  let reader = BufReader::new(File::open(path)?);
  Ok(serde_json::from_reader(reader)?)
}

impl Engine for ReplayEngine {
  type Input = PathBuf;
  type Error = ReplayError;

  fn output_shape(&self) -> OutputShape {
    self.shape
  }

  fn infer(&self, input: &PathBuf) -> Result<RawOutput, ReplayError> {
    debug!("读取回放张量: {}", input.display());
    let file = load(input)?;

    let actual = OutputShape::new(file.num_classes, file.num_anchors);
    if actual != self.shape {
      return Err(ReplayError::ShapeMismatch {
        expected: self.shape,
        actual,
      });
    }

    Ok(RawOutput::new(actual, file.data)?)
  }
}
