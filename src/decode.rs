// 该文件是 Anbu （安步） 项目的一部分。
// src/decode.rs - 输出张量解码
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

use tracing::debug;

use crate::{
  labels::LabelTable,
  model::Detection,
  tensor::{BOX_CHANNELS, RawOutput},
};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// 解码一帧输出张量，产出未排序、未去重的候选框集合。
///
/// 对每个锚点取各类别分数的最大值，严格大于阈值才产出候选；
/// 分数完全相同时取较小的类别索引。各锚点之间互不依赖。
pub fn decode(output: &RawOutput, labels: &LabelTable, threshold: f32) -> Vec<Detection> {
  let shape = output.shape();
  let mut candidates = Vec::new();

  for anchor in 0..shape.num_anchors {
    let mut max_conf = 0.0f32;
    let mut max_idx = 0usize;

    for class in 0..shape.num_classes {
      let conf = output.at(BOX_CHANNELS + class, anchor);
      if conf > max_conf {
        max_conf = conf;
        max_idx = class;
      }
    }

    if max_conf <= threshold {
      continue;
    }

    let cx = output.at(0, anchor);
    let cy = output.at(1, anchor);
    let w = output.at(2, anchor);
    let h = output.at(3, anchor);

    candidates.push(Detection {
      x1: cx - w / 2.0,
      y1: cy - h / 2.0,
      x2: cx + w / 2.0,
      y2: cy + h / 2.0,
      cx,
      cy,
      w,
      h,
      confidence: max_conf,
      class_id: max_idx,
      class_name: labels.name(max_idx),
    });
  }

  debug!("解码得到 {} 个候选框", candidates.len());
  candidates
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tensor::OutputShape;

  fn labels(names: &[&str]) -> LabelTable {
    LabelTable::from_lines(names.iter().copied()).unwrap()
  }

  fn output(num_classes: usize, num_anchors: usize, data: Vec<f32>) -> RawOutput {
    RawOutput::new(OutputShape::new(num_classes, num_anchors), data).unwrap()
  }

  #[test]
  fn emits_only_strictly_above_threshold() {
    // 锚点 0 的分数恰好等于阈值，不得产出
    let out = output(
      1,
      2,
      vec![
        0.5, 0.5, // cx
        0.5, 0.5, // cy
        0.2, 0.2, // w
        0.2, 0.2, // h
        0.3, 0.31, // 分数
      ],
    );

    let dets = decode(&out, &labels(&["person"]), 0.3);
    assert_eq!(dets.len(), 1);
    assert!((dets[0].confidence - 0.31).abs() < 1e-6);
  }

  #[test]
  fn nothing_above_threshold_yields_empty() {
    let out = output(1, 2, vec![0.5, 0.5, 0.5, 0.5, 0.2, 0.2, 0.2, 0.2, 0.1, 0.2]);
    assert!(decode(&out, &labels(&["person"]), 0.3).is_empty());
  }

  #[test]
  fn lower_class_index_wins_exact_tie() {
    // 类别 1 与类别 2 同分，取索引较小者
    let out = output(3, 1, vec![0.5, 0.5, 0.2, 0.2, 0.4, 0.7, 0.7]);

    let dets = decode(&out, &labels(&["a", "b", "c"]), 0.3);
    assert_eq!(dets.len(), 1);
    assert_eq!(dets[0].class_id, 1);
    assert_eq!(&*dets[0].class_name, "b");
    assert!((dets[0].confidence - 0.7).abs() < 1e-6);
  }

  #[test]
  fn corners_derive_from_center_form() {
    let out = output(1, 1, vec![0.5, 0.6, 0.4, 0.2, 0.9]);

    let dets = decode(&out, &labels(&["person"]), 0.3);
    let d = &dets[0];
    assert!((d.x1 - 0.3).abs() < 1e-6);
    assert!((d.y1 - 0.5).abs() < 1e-6);
    assert!((d.x2 - 0.7).abs() < 1e-6);
    assert!((d.y2 - 0.7).abs() < 1e-6);
    assert_eq!(d.cx, 0.5);
    assert_eq!(d.cy, 0.6);
    assert_eq!(d.w, 0.4);
    assert_eq!(d.h, 0.2);
  }

  #[test]
  fn candidates_keep_anchor_order() {
    let out = output(
      1,
      3,
      vec![
        0.1, 0.5, 0.9, // cx
        0.5, 0.5, 0.5, // cy
        0.1, 0.1, 0.1, // w
        0.1, 0.1, 0.1, // h
        0.6, 0.4, 0.8, // 分数
      ],
    );

    let dets = decode(&out, &labels(&["person"]), 0.3);
    assert_eq!(dets.len(), 3);
    assert_eq!(dets[0].cx, 0.1);
    assert_eq!(dets[1].cx, 0.5);
    assert_eq!(dets[2].cx, 0.9);
  }
}
