use embassy_time::Instant;

use crate::{Gesture, Gpio, Handler};

/// 每条 GPIO 线对应的按钮状态。只在注册时创建一次，之后的中断路径上不再分配。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Button {
    pub(crate) gpio: Gpio,
    handlers: [Option<Handler>; Gesture::COUNT],
    /// 仅用于在双击窗口内区分单击和双击，每个分类周期开始和结束时清零。
    pub(crate) press_count: u8,
    /// 最近一次确认按下的时间；确认释放时取走。
    pub(crate) pressed_at: Option<Instant>,
    /// 本次按压是否已经触发过保持回调。
    pub(crate) hold_fired: bool,
}

impl Button {
    pub(crate) fn new(gpio: Gpio) -> Self {
        Self {
            gpio,
            handlers: [None; Gesture::COUNT],
            press_count: 0,
            pressed_at: None,
            hold_fired: false,
        }
    }

    /// 单击回调为 `None` 时等同于诊断用的空回调。
    pub(crate) fn set_handler(&mut self, gesture: Gesture, handler: Option<Handler>) {
        self.handlers[gesture.index()] = handler;
    }

    pub(crate) fn has_handler(&self, gesture: Gesture) -> bool {
        self.handlers[gesture.index()].is_some()
    }

    /// 依次尝试 `chain` 中的手势，执行第一个已注册的回调；都没有则落到诊断空回调。
    pub(crate) fn invoke(&self, chain: &[Gesture]) {
        match chain.iter().find_map(|g| self.handlers[g.index()]) {
            Some(handler) => handler(self.gpio),
            None => warn!("gpio {}: no handler defined for {:?}", self.gpio, chain.first()),
        }
    }
}
