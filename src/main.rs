// 该文件是 Anbu （安步） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use anbu::{labels::LabelTable, model::ReplayEngine, pipeline::Pipeline};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("Anbu 检测后处理流水线");
  info!("标签文件: {}", args.labels);
  info!("置信度阈值: {}", args.confidence);
  info!("NMS 阈值: {}", args.nms_threshold);

  info!("正在加载标签...");
  let labels = LabelTable::from_path(&args.labels)?;

  info!("正在探测回放张量形状...");
  let first = args
    .tensors
    .first()
    .ok_or_else(|| anyhow::anyhow!("没有输入张量文件"))?;
  let engine = ReplayEngine::probe(first)?;

  let mut pipeline = Pipeline::with_thresholds(args.confidence, args.nms_threshold);
  pipeline.initialize(engine, labels)?;

  // Ctrl-C 时停在帧边界
  let (tx, rx) = std::sync::mpsc::channel();
  ctrlc::set_handler(move || {
    let _ = tx.send(());
  })
  .expect("Error setting Ctrl-C handler");

  info!("开始处理...");
  let mut frame_count = 0u64;
  let mut total_detections = 0usize;
  let started = std::time::Instant::now();

  for path in &args.tensors {
    if args.max_frames > 0 && frame_count >= args.max_frames {
      info!("已达到最大帧数限制: {}", args.max_frames);
      break;
    }
    if rx.try_recv().is_ok() {
      warn!("收到中断信号，退出处理循环");
      break;
    }

    let path = PathBuf::from(path);
    let now = std::time::Instant::now();
    let detections = pipeline.run(&path);
    info!(
      "帧 {} ({}): {} 个检测，耗时 {:.2?}",
      frame_count,
      path.display(),
      detections.len(),
      now.elapsed()
    );

    for det in &detections {
      info!(
        "  - {}: {:.2}% at ({:.3}, {:.3}) - ({:.3}, {:.3})",
        det.class_name,
        det.confidence * 100.0,
        det.x1,
        det.y1,
        det.x2,
        det.y2
      );
    }

    total_detections += detections.len();
    frame_count += 1;
  }

  info!(
    "处理完成! 总帧数: {}, 总检测数: {}, 总耗时: {:.2?}",
    frame_count,
    total_detections,
    started.elapsed()
  );

  Ok(())
}
