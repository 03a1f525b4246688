// 该文件是 Anbu （安步） 项目的一部分。
// src/model.rs - 检测结果与推理引擎接口
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::sync::Arc;

use crate::tensor::{OutputShape, RawOutput};

/// 单个检测结果，创建后不再修改。
///
/// 坐标均为相对模型输入空间的归一化值；解码出的宽高为负时，
/// 角点不保证 x1 < x2 / y1 < y2。
#[derive(Debug, Clone)]
pub struct Detection {
  /// 左上角 x 坐标
  pub x1: f32,
  /// 左上角 y 坐标
  pub y1: f32,
  /// 右下角 x 坐标
  pub x2: f32,
  /// 右下角 y 坐标
  pub y2: f32,
  /// 中心点 x 坐标（张量原值）
  pub cx: f32,
  /// 中心点 y 坐标（张量原值）
  pub cy: f32,
  /// 宽度（张量原值）
  pub w: f32,
  /// 高度（张量原值）
  pub h: f32,
  /// 置信度：该锚点各类别分数的最大值
  pub confidence: f32,
  /// 类别索引
  pub class_id: usize,
  /// 类别名称，引用标签表中的条目
  pub class_name: Arc<str>,
}

/// 推理引擎接口。引擎本身是不透明的外部协作方：
/// 输入一帧预处理数据，同步产出原始输出张量，内部可能阻塞。
/// 引擎在 initialize 后只读，可被多次 infer 复用。
pub trait Engine {
  type Input;
  type Error;

  /// 引擎声明的输出形状，流水线初始化时读取一次。
  fn output_shape(&self) -> OutputShape;

  fn infer(&self, input: &Self::Input) -> Result<RawOutput, Self::Error>;
}

mod replay;
pub use self::replay::{ReplayEngine, ReplayError};
