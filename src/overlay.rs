// 该文件是 Anbu （安步） 项目的一部分。
// src/overlay.rs - 叠加层的信箱式坐标映射
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::{frame::SourceSize, model::Detection};

/// 视图坐标系中的矩形（像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
  pub left: f32,
  pub top: f32,
  pub right: f32,
  pub bottom: f32,
}

/// 信箱式适配：按 min(视图宽/源宽, 视图高/源高) 等比缩放后居中，
/// 剩余的一轴留对称边距。负责把归一化检测坐标映射回视图像素坐标；
/// 绘制本身由叠加层协作方完成。
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
  drawn_width: f32,
  drawn_height: f32,
  offset_x: f32,
  offset_y: f32,
}

impl Letterbox {
  /// 源尺寸为零时无法建立映射，返回 None。
  pub fn fit(view_width: f32, view_height: f32, source: SourceSize) -> Option<Self> {
    if source.width == 0 || source.height == 0 {
      return None;
    }

    let scale = (view_width / source.width as f32).min(view_height / source.height as f32);
    let drawn_width = source.width as f32 * scale;
    let drawn_height = source.height as f32 * scale;

    Some(Self {
      drawn_width,
      drawn_height,
      offset_x: (view_width - drawn_width) / 2.0,
      offset_y: (view_height - drawn_height) / 2.0,
    })
  }

  /// 把一个检测框的归一化角点映射到视图坐标。
  pub fn project(&self, detection: &Detection) -> ViewRect {
    ViewRect {
      left: detection.x1 * self.drawn_width + self.offset_x,
      top: detection.y1 * self.drawn_height + self.offset_y,
      right: detection.x2 * self.drawn_width + self.offset_x,
      bottom: detection.y2 * self.drawn_height + self.offset_y,
    }
  }

  pub fn drawn_size(&self) -> (f32, f32) {
    (self.drawn_width, self.drawn_height)
  }

  pub fn offsets(&self) -> (f32, f32) {
    (self.offset_x, self.offset_y)
  }
}
