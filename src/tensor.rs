// 该文件是 Anbu （安步） 项目的一部分。
// src/tensor.rs - 模型输出张量定义
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

use thiserror::Error;

/// 前四个通道固定为 cx, cy, w, h。
pub const BOX_CHANNELS: usize = 4;

/// 模型声明的输出形状：逻辑上为 [1, 4 + 类别数, 锚点数]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputShape {
  pub num_classes: usize,
  pub num_anchors: usize,
}

impl OutputShape {
  pub fn new(num_classes: usize, num_anchors: usize) -> Self {
    Self {
      num_classes,
      num_anchors,
    }
  }

  pub fn channels(&self) -> usize {
    BOX_CHANNELS + self.num_classes
  }

  pub fn len(&self) -> usize {
    self.channels() * self.num_anchors
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[derive(Error, Debug)]
pub enum TensorError {
  #[error("输出张量长度不匹配: 期望 {expected}, 实际 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 一帧的原始输出张量：按通道优先、锚点次之的行主序平铺。
/// 每帧新建，帧间不共享。
#[derive(Debug, Clone)]
pub struct RawOutput {
  shape: OutputShape,
  data: Box<[f32]>,
}

impl RawOutput {
  pub fn new(shape: OutputShape, data: Vec<f32>) -> Result<Self, TensorError> {
    if data.len() != shape.len() {
      return Err(TensorError::LengthMismatch {
        expected: shape.len(),
        actual: data.len(),
      });
    }

    Ok(Self {
      shape,
      data: data.into_boxed_slice(),
    })
  }

  pub fn from_slice(shape: OutputShape, data: &[f32]) -> Result<Self, TensorError> {
    Self::new(shape, data.to_vec())
  }

  pub fn shape(&self) -> OutputShape {
    self.shape
  }

  /// 读取指定通道、指定锚点处的值。
  pub fn at(&self, channel: usize, anchor: usize) -> f32 {
    self.data[channel * self.shape.num_anchors + anchor]
  }
}
