// 该文件是 Anbu （安步） 项目的一部分。
// src/task.rs - 专用工作线程与只保留最新帧的背压
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

use std::{
  sync::{Arc, Condvar, Mutex},
  thread,
};

use tracing::{debug, info};

use crate::{
  frame::SourceSize,
  model::{Detection, Engine},
  pipeline::Pipeline,
};

/// 单槽位帧交接：生产者放入新帧时替换掉尚未取走的旧帧，
/// 队列永远不会增长，过期帧永远不会被处理。
pub struct LatestSlot<T> {
  shared: Arc<Shared<T>>,
}

impl<T> Clone for LatestSlot<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

struct Shared<T> {
  state: Mutex<SlotState<T>>,
  available: Condvar,
}

struct SlotState<T> {
  item: Option<T>,
  closed: bool,
  dropped: u64,
}

impl<T> Default for LatestSlot<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> LatestSlot<T> {
  pub fn new() -> Self {
    Self {
      shared: Arc::new(Shared {
        state: Mutex::new(SlotState {
          item: None,
          closed: false,
          dropped: 0,
        }),
        available: Condvar::new(),
      }),
    }
  }

  /// 放入一帧；若上一帧尚未被取走则替换之并计入丢弃数。
  /// 槽位已关闭时静默丢弃。
  pub fn offer(&self, item: T) {
    let mut state = self.shared.state.lock().expect("slot mutex poisoned");
    if state.closed {
      return;
    }
    if state.item.replace(item).is_some() {
      state.dropped += 1;
    }
    drop(state);
    self.shared.available.notify_one();
  }

  /// 阻塞等待下一帧；槽位关闭且为空时返回 None。
  pub fn take(&self) -> Option<T> {
    let mut state = self.shared.state.lock().expect("slot mutex poisoned");
    loop {
      if let Some(item) = state.item.take() {
        return Some(item);
      }
      if state.closed {
        return None;
      }
      state = self
        .shared
        .available
        .wait(state)
        .expect("slot mutex poisoned");
    }
  }

  pub fn close(&self) {
    let mut state = self.shared.state.lock().expect("slot mutex poisoned");
    state.closed = true;
    drop(state);
    self.shared.available.notify_all();
  }

  /// 因背压被替换掉的帧数。
  pub fn dropped(&self) -> u64 {
    self.shared.state.lock().expect("slot mutex poisoned").dropped
  }
}

/// 一帧待处理的工作项：预处理后的输入与原始帧尺寸。
pub struct WorkFrame<I> {
  pub input: I,
  pub source: SourceSize,
}

/// 专用工作线程：逐帧串行驱动流水线，detect 绝不并发重入；
/// 每帧的检测列表连同原始帧尺寸交给消费者回调。
pub struct Worker<I> {
  slot: LatestSlot<WorkFrame<I>>,
  handle: Option<thread::JoinHandle<()>>,
}

impl<I: Send + 'static> Worker<I> {
  pub fn spawn<E, F>(pipeline: Pipeline<E>, mut consume: F) -> Self
  where
    E: Engine<Input = I> + Send + 'static,
    E::Error: std::fmt::Display,
    F: FnMut(Vec<Detection>, SourceSize) + Send + 'static,
  {
    let slot: LatestSlot<WorkFrame<I>> = LatestSlot::new();
    let frames = slot.clone();
    let handle = thread::spawn(move || {
      info!("检测工作线程启动");
      while let Some(frame) = frames.take() {
        let detections = pipeline.run(&frame.input);
        debug!("本帧检测到 {} 个对象", detections.len());
        consume(detections, frame.source);
      }
      info!("检测工作线程退出");
    });

    Self {
      slot,
      handle: Some(handle),
    }
  }

  /// 提交一帧；工作线程忙时替换掉尚未开始处理的旧帧。
  pub fn submit(&self, input: I, source: SourceSize) {
    self.slot.offer(WorkFrame { input, source });
  }
}

impl<I> Worker<I> {
  /// 因背压被丢弃的帧数。
  pub fn dropped(&self) -> u64 {
    self.slot.dropped()
  }

  /// 关闭槽位并等待工作线程处理完最后一帧。
  pub fn shutdown(mut self) {
    self.close_and_join();
  }

  fn close_and_join(&mut self) {
    self.slot.close();
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }
}

impl<I> Drop for Worker<I> {
  fn drop(&mut self) {
    self.close_and_join();
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::mpsc, time::Duration};

  use super::*;
  use crate::{
    labels::LabelTable,
    tensor::{OutputShape, RawOutput, TensorError},
  };

  #[test]
  fn slot_keeps_only_latest() {
    let slot = LatestSlot::new();
    slot.offer(1);
    slot.offer(2);
    slot.offer(3);

    assert_eq!(slot.take(), Some(3));
    assert_eq!(slot.dropped(), 2);

    slot.close();
    assert_eq!(slot.take(), None);
  }

  #[test]
  fn take_blocks_until_offer() {
    let slot = LatestSlot::new();
    let producer = slot.clone();

    let handle = thread::spawn(move || {
      thread::sleep(Duration::from_millis(20));
      producer.offer(42);
    });

    assert_eq!(slot.take(), Some(42));
    handle.join().unwrap();
  }

  #[test]
  fn close_unblocks_take() {
    let slot = LatestSlot::<u32>::new();
    let consumer = slot.clone();

    let handle = thread::spawn(move || consumer.take());
    thread::sleep(Duration::from_millis(20));
    slot.close();

    assert_eq!(handle.join().unwrap(), None);
  }

  #[test]
  fn offer_after_close_is_dropped() {
    let slot = LatestSlot::new();
    slot.close();
    slot.offer(1);
    assert_eq!(slot.take(), None);
  }

  struct FixedEngine {
    shape: OutputShape,
    data: Vec<f32>,
  }

  impl Engine for FixedEngine {
    type Input = ();
    type Error = TensorError;

    fn output_shape(&self) -> OutputShape {
      self.shape
    }

    fn infer(&self, _input: &()) -> Result<RawOutput, TensorError> {
      RawOutput::new(self.shape, self.data.clone())
    }
  }

  #[test]
  fn worker_runs_pipeline_and_reports_source_size() {
    let engine = FixedEngine {
      shape: OutputShape::new(1, 2),
      data: vec![0.5, 0.52, 0.5, 0.5, 0.4, 0.4, 0.4, 0.4, 0.9, 0.6],
    };
    let labels = LabelTable::from_lines(["person"]).unwrap();
    let mut pipeline = Pipeline::new();
    pipeline.initialize(engine, labels).unwrap();

    let (tx, rx) = mpsc::channel();
    let worker = Worker::spawn(pipeline, move |detections, source| {
      tx.send((detections, source)).unwrap();
    });

    worker.submit((), SourceSize::new(1920, 1080));

    let (detections, source) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(detections.len(), 1);
    assert!((detections[0].confidence - 0.9).abs() < 1e-6);
    assert_eq!(source, SourceSize::new(1920, 1080));

    worker.shutdown();
  }

  #[test]
  fn shutdown_drains_pending_frame() {
    let engine = FixedEngine {
      shape: OutputShape::new(1, 1),
      data: vec![0.5, 0.5, 0.2, 0.2, 0.8],
    };
    let labels = LabelTable::from_lines(["person"]).unwrap();
    let mut pipeline = Pipeline::new();
    pipeline.initialize(engine, labels).unwrap();

    let (tx, rx) = mpsc::channel();
    let worker = Worker::spawn(pipeline, move |detections, _source| {
      tx.send(detections.len()).unwrap();
    });

    worker.submit((), SourceSize::new(640, 480));
    worker.shutdown();

    // 关闭前提交的帧仍会被处理
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
  }
}
