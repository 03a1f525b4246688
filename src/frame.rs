// 该文件是 Anbu （安步） 项目的一部分。
// src/frame.rs - 预处理帧契约与原始帧尺寸
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

const RGB_CHANNELS: usize = 3;

/// 送入推理引擎的预处理帧。
///
/// 上游预处理协作方须保证：已旋转至正向、缩放到 S×S 的方形输入、
/// 归一化到 [0,1] 的 f32，CHW 排布。本库只校验长度，不做任何像素变换。
#[derive(Debug, Clone)]
pub struct RgbChwFrame<const S: u32> {
  data: Box<[f32]>,
}

impl<const S: u32> From<Vec<f32>> for RgbChwFrame<S> {
  fn from(data: Vec<f32>) -> Self {
    if data.len() != (RGB_CHANNELS * S as usize * S as usize) {
      panic!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        RGB_CHANNELS * S as usize * S as usize,
        data.len()
      );
    }

    Self {
      data: data.into_boxed_slice(),
    }
  }
}

impl<const S: u32> Default for RgbChwFrame<S> {
  fn default() -> Self {
    let size = RGB_CHANNELS * (S as usize) * (S as usize);
    let data = vec![0f32; size].into_boxed_slice();
    Self { data }
  }
}

impl<const S: u32> RgbChwFrame<S> {
  pub fn side(&self) -> usize {
    S as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn as_chw(&self) -> &[f32] {
    &self.data
  }
}

impl<const S: u32> AsMut<[f32]> for RgbChwFrame<S> {
  fn as_mut(&mut self) -> &mut [f32] {
    &mut self.data
  }
}

/// 原始帧（旋转前、信箱适配前）的宽高。
/// 叠加层依据它把归一化坐标映射回视图坐标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSize {
  pub width: u32,
  pub height: u32,
}

impl SourceSize {
  pub fn new(width: u32, height: u32) -> Self {
    Self { width, height }
  }

  /// 由相机帧尺寸与旋转角（90 度的倍数）得到正向后的原始尺寸。
  /// 旋转 90/270 度时宽高互换。
  pub fn of_rotated_frame(width: u32, height: u32, rotation_degrees: i32) -> Self {
    if rotation_degrees % 180 != 0 {
      Self {
        width: height,
        height: width,
      }
    } else {
      Self { width, height }
    }
  }
}
