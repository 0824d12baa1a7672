use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::{StepEvent, StepStatus};
use crate::record::StepRecord;

/// 一次事件折叠的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    /// 心跳、未知事件或重复的完成事件
    Ignored,
    Started,
    /// 同一序号再次开始，原记录被替换
    Restarted { was_terminal: bool },
    Appended,
    Finished,
    /// 已处于终态的步骤再次收到 `step_end`，保持不变
    AlreadyTerminal,
    /// 没有对应 `step_start` 的 `step_log`/`step_end`，被丢弃
    Orphaned,
    Completed,
}

/// 各状态的步骤数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub success: usize,
    pub failed: usize,
}

/// 一次执行的步骤视图
///
/// 步骤按 `step_order` 升序保存，与到达顺序无关。`is_complete` 一旦为真不再回退。
#[derive(Debug, Clone, Default)]
pub struct StreamSession {
    steps: BTreeMap<u32, StepRecord>,
    is_complete: bool,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一个事件折叠进当前视图
    pub fn fold(&mut self, event: &StepEvent) -> FoldOutcome {
        match event {
            StepEvent::Heartbeat | StepEvent::Unknown => FoldOutcome::Ignored,
            StepEvent::StepStart(data) => {
                match self.steps.insert(data.step_order, StepRecord::started(data)) {
                    None => FoldOutcome::Started,
                    Some(previous) => {
                        let was_terminal = previous.is_terminal();
                        if was_terminal {
                            // 与上游行为保持一致：替换已结束的步骤，但需要提示
                            warn!(
                                step_order = data.step_order,
                                previous_status = previous.status.as_str(),
                                "已结束的步骤再次开始，记录被重置为运行中"
                            );
                        } else {
                            debug!(step_order = data.step_order, "重复的步骤开始事件");
                        }
                        FoldOutcome::Restarted { was_terminal }
                    }
                }
            }
            StepEvent::StepLog(data) => match self.steps.get_mut(&data.step_order) {
                Some(record) => {
                    record.append_output(&data.output);
                    FoldOutcome::Appended
                }
                None => {
                    debug!(step_order = data.step_order, "丢弃无对应步骤的日志事件");
                    FoldOutcome::Orphaned
                }
            },
            StepEvent::StepEnd(data) => match self.steps.get_mut(&data.step_order) {
                Some(record) if record.is_terminal() => {
                    debug!(
                        step_order = data.step_order,
                        status = record.status.as_str(),
                        "步骤已处于终态，忽略结束事件"
                    );
                    FoldOutcome::AlreadyTerminal
                }
                Some(record) => {
                    record.finish(data);
                    FoldOutcome::Finished
                }
                None => {
                    debug!(step_order = data.step_order, "丢弃无对应步骤的结束事件");
                    FoldOutcome::Orphaned
                }
            },
            StepEvent::Complete => {
                if self.is_complete {
                    FoldOutcome::Ignored
                } else {
                    self.is_complete = true;
                    FoldOutcome::Completed
                }
            }
        }
    }

    /// 按 `step_order` 升序遍历步骤
    pub fn steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.values()
    }

    pub fn step(&self, step_order: u32) -> Option<&StepRecord> {
        self.steps.get(&step_order)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn summary(&self) -> StepSummary {
        self.steps.values().fold(
            StepSummary {
                total: self.steps.len(),
                ..StepSummary::default()
            },
            |mut summary, record| {
                match record.status {
                    StepStatus::Pending => summary.pending += 1,
                    StepStatus::Running => summary.running += 1,
                    StepStatus::Success => summary.success += 1,
                    StepStatus::Failed => summary.failed += 1,
                }
                summary
            },
        )
    }
}
