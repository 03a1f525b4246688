// 该文件是 Anbu （安步） 项目的一部分。
// src/nms.rs - 交并比与贪心非极大值抑制
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

use crate::model::Detection;

pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// 计算两个检测框的交并比。
///
/// 交集为两个角点矩形的重叠面积，任一轴不重叠时为 0（不做除法）。
/// 并集项使用解码得到的 w*h 乘积而非角点矩形面积；角点被裁剪或
/// 反转时两者会不一致，这是既有的可观测行为，原样保留。
pub fn iou(a: &Detection, b: &Detection) -> f32 {
  let x1 = a.x1.max(b.x1);
  let y1 = a.y1.max(b.y1);
  let x2 = a.x2.min(b.x2);
  let y2 = a.y2.min(b.y2);

  if x1 >= x2 || y1 >= y2 {
    return 0.0;
  }

  let intersection = (x2 - x1) * (y2 - y1);
  let area_a = a.w * a.h;
  let area_b = b.w * b.h;
  intersection / (area_a + area_b - intersection)
}

/// 贪心非极大值抑制，输入候选集合，返回新的保留集合。
///
/// 候选先按置信度降序稳定排序（同分保持解码顺序），每轮取出
/// 置信度最高者加入结果，再剔除与其交并比不小于阈值的其余候选。
/// 返回顺序即接受顺序，亦即置信度降序。
pub fn suppress(candidates: Vec<Detection>, threshold: f32) -> Vec<Detection> {
  let mut remaining = candidates;
  remaining.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

  let mut accepted = Vec::new();
  while !remaining.is_empty() {
    let best = remaining.remove(0);
    remaining.retain(|det| iou(&best, det) < threshold);
    accepted.push(best);
  }

  debug!("NMS 后保留 {} 个检测框", accepted.len());
  accepted
}
