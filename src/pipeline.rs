// 该文件是 Anbu （安步） 项目的一部分。
// src/pipeline.rs - 检测流水线编排
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
use tracing::{info, warn};

use crate::{
  decode,
  labels::LabelTable,
  model::{Detection, Engine},
  nms,
  tensor::{OutputShape, RawOutput},
};

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error("流水线已初始化，不允许重复初始化")]
  AlreadyInitialized,
  #[error("标签数量 {labels} 与模型类别数 {classes} 不一致")]
  ClassCountMismatch { labels: usize, classes: usize },
}

enum State<E> {
  Uninitialized,
  Ready(Ready<E>),
}

struct Ready<E> {
  engine: E,
  labels: LabelTable,
  shape: OutputShape,
}

/// 检测流水线：显式的「未初始化 → 就绪」两态机。
///
/// 调用方持有实例并显式传递，不依赖全局单例。配置错误在
/// initialize 时上抛；逐帧问题一律降级为空结果，连续视频流
/// 中的单个坏帧绝不中断循环。同一输入张量的 detect 结果
/// 完全确定，帧间没有共享可变状态。
pub struct Pipeline<E> {
  state: State<E>,
  confidence_threshold: f32,
  iou_threshold: f32,
}

impl<E> Default for Pipeline<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E> Pipeline<E> {
  pub fn new() -> Self {
    Self::with_thresholds(decode::DEFAULT_CONFIDENCE_THRESHOLD, nms::DEFAULT_IOU_THRESHOLD)
  }

  pub fn with_thresholds(confidence_threshold: f32, iou_threshold: f32) -> Self {
    Self {
      state: State::Uninitialized,
      confidence_threshold,
      iou_threshold,
    }
  }

  pub fn is_ready(&self) -> bool {
    matches!(self.state, State::Ready(_))
  }
}

impl<E: Engine> Pipeline<E> {
  /// 绑定推理引擎与标签表，输出形状取自引擎的声明。
  /// 只允许调用一次；类别数不匹配属于配置错误，直接上抛。
  pub fn initialize(&mut self, engine: E, labels: LabelTable) -> Result<(), PipelineError> {
    if self.is_ready() {
      return Err(PipelineError::AlreadyInitialized);
    }

    let shape = engine.output_shape();
    if labels.len() != shape.num_classes {
      return Err(PipelineError::ClassCountMismatch {
        labels: labels.len(),
        classes: shape.num_classes,
      });
    }

    info!(
      "流水线就绪: {} 类别, {} 锚点",
      shape.num_classes, shape.num_anchors
    );
    self.state = State::Ready(Ready {
      engine,
      labels,
      shape,
    });
    Ok(())
  }

  /// 对一帧的原始输出张量做解码与抑制，返回最终检测列表。
  /// 未初始化或张量长度不合法时返回空列表。
  pub fn detect(&self, tensor: &[f32]) -> Vec<Detection> {
    let ready = match &self.state {
      State::Ready(ready) => ready,
      State::Uninitialized => {
        warn!("流水线尚未初始化，本帧返回空结果");
        return Vec::new();
      }
    };

    let output = match RawOutput::from_slice(ready.shape, tensor) {
      Ok(output) => output,
      Err(e) => {
        warn!("输出张量不合法: {}，本帧返回空结果", e);
        return Vec::new();
      }
    };

    self.postprocess(ready, &output)
  }

  /// 完整的一帧流程：调用推理引擎，再做后处理。
  /// 引擎失败按瞬态错误处理，本帧降级为空结果。
  pub fn run(&self, input: &E::Input) -> Vec<Detection>
  where
    E::Error: std::fmt::Display,
  {
    let ready = match &self.state {
      State::Ready(ready) => ready,
      State::Uninitialized => {
        warn!("流水线尚未初始化，本帧返回空结果");
        return Vec::new();
      }
    };

    let output = match ready.engine.infer(input) {
      Ok(output) => output,
      Err(e) => {
        warn!("推理失败: {}，本帧返回空结果", e);
        return Vec::new();
      }
    };

    if output.shape() != ready.shape {
      warn!("输出张量形状与引擎声明不符，本帧返回空结果");
      return Vec::new();
    }

    self.postprocess(ready, &output)
  }

  fn postprocess(&self, ready: &Ready<E>, output: &RawOutput) -> Vec<Detection> {
    let candidates = decode::decode(output, &ready.labels, self.confidence_threshold);
    nms::suppress(candidates, self.iou_threshold)
  }
}
